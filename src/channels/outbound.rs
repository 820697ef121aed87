//! The outbound sender seam and recipient addressing.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ChannelError;

/// Address prefix the messaging gateway expects on every WhatsApp recipient.
pub const CHANNEL_PREFIX: &str = "whatsapp:";

/// Tag an address with the channel prefix unless it already carries one.
///
/// Idempotent: `normalize_recipient(normalize_recipient(x)) == normalize_recipient(x)`.
pub fn normalize_recipient(address: &str) -> String {
    let address = address.trim();
    if address.starts_with(CHANNEL_PREFIX) {
        address.to_string()
    } else {
        format!("{CHANNEL_PREFIX}{address}")
    }
}

/// A message ready to hand to an [`OutboundSender`]. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    /// Always channel-prefixed.
    pub recipient: String,
    pub body: String,
}

impl OutboundMessage {
    pub fn new(recipient: &str, body: impl Into<String>) -> Self {
        Self {
            recipient: normalize_recipient(recipient),
            body: body.into(),
        }
    }
}

/// Delivers one text message. One attempt, no retries.
#[async_trait]
pub trait OutboundSender: Send + Sync {
    /// Channel name used in logs and errors.
    fn name(&self) -> &str;

    /// Send `body` to `recipient`.
    async fn send(&self, recipient: &str, body: &str) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number_gets_prefixed() {
        assert_eq!(normalize_recipient("+15551234"), "whatsapp:+15551234");
    }

    #[test]
    fn prefixed_number_is_untouched() {
        assert_eq!(
            normalize_recipient("whatsapp:+15551234"),
            "whatsapp:+15551234"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_recipient("+15551234");
        assert_eq!(normalize_recipient(&once), once);
        assert_eq!(once.matches(CHANNEL_PREFIX).count(), 1);
    }

    #[test]
    fn surrounding_whitespace_is_dropped() {
        assert_eq!(normalize_recipient("  +1555 "), "whatsapp:+1555");
    }

    #[test]
    fn outbound_message_normalizes_recipient() {
        let msg = OutboundMessage::new("+1555", "hi");
        assert_eq!(msg.recipient, "whatsapp:+1555");
        assert_eq!(msg.body, "hi");
    }
}
