//! Outbound message bodies.

/// Sent to a sender who echoed the activation code.
pub fn activation_confirmed() -> String {
    "✅ Your access is activated!\n\
     Send your payment screenshot here to receive the group invite."
        .to_string()
}

/// Sent to a sender whose payment proof arrived before activation.
pub fn activation_instructions(activation_code: &str) -> String {
    format!(
        "🖼️ We received your payment screenshot.\n\
         To activate your access, reply with this code:\n\
         {activation_code}"
    )
}

/// Sent to the admin when a sender is waiting on activation.
pub fn admin_pending_activation(sender: &str, activation_code: &str) -> String {
    format!(
        "🔔 New pending activation\n\
         From: {sender}\n\
         Activation code: {activation_code}"
    )
}

/// Sent to an activated sender once their payment proof arrives.
pub fn group_invite(group_invite_link: &str) -> String {
    format!(
        "🎉 Payment verified!\n\
         Join the group:\n\
         {group_invite_link}"
    )
}
