//! Outbound messaging channels.

pub mod outbound;
pub mod twilio;

pub use outbound::{CHANNEL_PREFIX, OutboundMessage, OutboundSender, normalize_recipient};
pub use twilio::TwilioSender;
