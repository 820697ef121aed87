//! Shared types for the inbound event pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::channels::OutboundMessage;
use crate::registry::SenderStatus;

// ── Inbound event ───────────────────────────────────────────────────

/// One inbound chat message, as delivered by the gateway webhook.
///
/// Created per request and dropped after processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Correlation ID for logs.
    pub id: Uuid,
    /// Sender address (e.g. `whatsapp:+15551234`). Empty means malformed.
    pub sender: String,
    /// Raw message body, possibly empty.
    pub text: String,
    /// Number of attached media items.
    pub attachment_count: u32,
}

impl InboundEvent {
    pub fn new(sender: impl Into<String>, text: impl Into<String>, attachment_count: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            text: text.into(),
            attachment_count,
        }
    }

    pub fn has_attachments(&self) -> bool {
        self.attachment_count > 0
    }
}

// ── Decision ────────────────────────────────────────────────────────

/// Which rule handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Text matched the activation code.
    ActivationCode,
    /// Attachment from a sender who has not activated yet.
    PendingActivation,
    /// Attachment from an activated sender.
    PaymentVerified,
    /// Nothing matched.
    Ignored,
}

impl Rule {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ActivationCode => "activation_code",
            Self::PendingActivation => "pending_activation",
            Self::PaymentVerified => "payment_verified",
            Self::Ignored => "ignored",
        }
    }
}

/// Outcome of evaluating the rules, before anything is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub rule: Rule,
    /// `None` leaves the registry untouched.
    pub new_status: Option<SenderStatus>,
    pub messages: Vec<OutboundMessage>,
}

impl Decision {
    pub fn ignored() -> Self {
        Self {
            rule: Rule::Ignored,
            new_status: None,
            messages: Vec::new(),
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Result of one send attempt.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub recipient: String,
    pub delivered: bool,
    /// Error text when delivery failed.
    pub error: Option<String>,
}

/// What processing an event did.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub event_id: Uuid,
    pub sender: String,
    pub rule: Rule,
    pub previous_status: SenderStatus,
    pub status: SenderStatus,
    pub deliveries: Vec<Delivery>,
}

impl ProcessOutcome {
    pub fn failed_deliveries(&self) -> usize {
        self.deliveries.iter().filter(|d| !d.delivered).count()
    }
}
