//! Invite bridge — WhatsApp activation and group-invite automation.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod webhook;
