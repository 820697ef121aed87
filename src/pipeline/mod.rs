//! Inbound event pipeline.
//!
//! Every webhook message flows through:
//! 1. `EventProcessor::process()` — validation and per-sender locking
//! 2. `rules::decide()` — the activation state machine (pure)
//! 3. Dispatch — each queued message goes to the `OutboundSender` once
//!
//! **Delivery never fails an event.** Failed sends are logged and reported
//! in the `ProcessOutcome` only.

pub mod processor;
pub mod rules;
pub mod templates;
pub mod types;

pub use processor::EventProcessor;
pub use types::{Decision, Delivery, InboundEvent, ProcessOutcome, Rule};
