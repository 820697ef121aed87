//! Activation rules — the per-sender state machine.
//!
//! Rules are checked in a fixed order and the first match wins:
//! 1. Text equals the activation code → `Activated`, confirm to sender
//! 2. Attachment from a non-activated sender → `AwaitingActivation`,
//!    instructions to sender + notice to admin
//! 3. Attachment from an activated sender → `Active`, group invite to sender
//!
//! Anything else is ignored. There is no terminal state.

use crate::channels::OutboundMessage;
use crate::config::BridgeConfig;
use crate::pipeline::templates;
use crate::pipeline::types::{Decision, InboundEvent, Rule};
use crate::registry::SenderStatus;

/// Whether `text` is the activation code, ignoring case and surrounding whitespace.
pub fn matches_activation_code(text: &str, activation_code: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.to_lowercase() == activation_code.trim().to_lowercase()
}

/// Decide the next status and the messages to send. Pure: touches nothing.
pub fn decide(event: &InboundEvent, current: SenderStatus, config: &BridgeConfig) -> Decision {
    if matches_activation_code(&event.text, &config.activation_code) {
        return Decision {
            rule: Rule::ActivationCode,
            new_status: Some(SenderStatus::Activated),
            messages: vec![OutboundMessage::new(
                &event.sender,
                templates::activation_confirmed(),
            )],
        };
    }

    if !event.has_attachments() {
        return Decision::ignored();
    }

    if current.is_activated() {
        Decision {
            rule: Rule::PaymentVerified,
            new_status: Some(SenderStatus::Active),
            messages: vec![OutboundMessage::new(
                &event.sender,
                templates::group_invite(&config.group_invite_link),
            )],
        }
    } else {
        Decision {
            rule: Rule::PendingActivation,
            new_status: Some(SenderStatus::AwaitingActivation),
            messages: vec![
                OutboundMessage::new(
                    &event.sender,
                    templates::activation_instructions(&config.activation_code),
                ),
                OutboundMessage::new(
                    &config.admin_recipient,
                    templates::admin_pending_activation(&event.sender, &config.activation_code),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "whatsapp:+15551234";

    fn config() -> BridgeConfig {
        BridgeConfig {
            activation_code: "CODE123".into(),
            admin_recipient: "+15550000001".into(),
            group_invite_link: "https://chat.whatsapp.com/abc".into(),
        }
    }

    fn event(text: &str, attachments: u32) -> InboundEvent {
        InboundEvent::new(SENDER, text, attachments)
    }

    const ALL_STATUSES: [SenderStatus; 4] = [
        SenderStatus::Unknown,
        SenderStatus::AwaitingActivation,
        SenderStatus::Activated,
        SenderStatus::Active,
    ];

    // ── Activation code ─────────────────────────────────────────────

    #[test]
    fn code_match_ignores_case_and_whitespace() {
        assert!(matches_activation_code("CODE123", "CODE123"));
        assert!(matches_activation_code("  code123\n", "CODE123"));
        assert!(matches_activation_code("Code123", "code123"));
        assert!(!matches_activation_code("CODE1234", "CODE123"));
        assert!(!matches_activation_code("my code is CODE123", "CODE123"));
        assert!(!matches_activation_code("", "CODE123"));
    }

    #[test]
    fn code_activates_from_every_status() {
        for status in ALL_STATUSES {
            for attachments in [0, 2] {
                let decision = decide(&event(" code123 ", attachments), status, &config());
                assert_eq!(decision.rule, Rule::ActivationCode, "from {status}");
                assert_eq!(decision.new_status, Some(SenderStatus::Activated));
                assert_eq!(decision.messages.len(), 1);
                assert_eq!(decision.messages[0].recipient, SENDER);
            }
        }
    }

    // ── No trigger ──────────────────────────────────────────────────

    #[test]
    fn plain_text_without_attachment_is_ignored() {
        for status in ALL_STATUSES {
            let decision = decide(&event("hello", 0), status, &config());
            assert_eq!(decision, Decision::ignored());
        }
    }

    // ── Attachments ─────────────────────────────────────────────────

    #[test]
    fn attachment_from_unknown_awaits_activation() {
        let decision = decide(&event("", 1), SenderStatus::Unknown, &config());
        assert_eq!(decision.rule, Rule::PendingActivation);
        assert_eq!(decision.new_status, Some(SenderStatus::AwaitingActivation));
        assert_eq!(decision.messages.len(), 2);

        let to_sender = &decision.messages[0];
        let to_admin = &decision.messages[1];
        assert_eq!(to_sender.recipient, SENDER);
        assert_eq!(to_admin.recipient, "whatsapp:+15550000001");
        assert!(to_sender.body.contains("CODE123"));
        assert!(to_admin.body.contains("CODE123"));
        assert!(to_admin.body.contains(SENDER));
    }

    #[test]
    fn attachment_while_awaiting_reprompts() {
        let decision = decide(&event("", 3), SenderStatus::AwaitingActivation, &config());
        assert_eq!(decision.rule, Rule::PendingActivation);
        assert_eq!(decision.new_status, Some(SenderStatus::AwaitingActivation));
        assert_eq!(decision.messages.len(), 2);
    }

    #[test]
    fn attachment_from_activated_sends_invite() {
        for status in [SenderStatus::Activated, SenderStatus::Active] {
            let decision = decide(&event("here you go", 1), status, &config());
            assert_eq!(decision.rule, Rule::PaymentVerified);
            assert_eq!(decision.new_status, Some(SenderStatus::Active));
            assert_eq!(decision.messages.len(), 1);
            assert_eq!(decision.messages[0].recipient, SENDER);
            assert!(decision.messages[0].body.contains("https://chat.whatsapp.com/abc"));
        }
    }

    #[test]
    fn unprefixed_sender_is_normalized() {
        let decision = decide(
            &InboundEvent::new("+15551234", "", 1),
            SenderStatus::Active,
            &config(),
        );
        assert_eq!(decision.messages[0].recipient, "whatsapp:+15551234");
    }
}
