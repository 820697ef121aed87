//! Sender registry — per-sender activation status, held in memory.
//!
//! The registry is process-wide but owned: it is built once in `main` and
//! handed to the processor as an `Arc<dyn SenderRegistry>`. Nothing survives
//! a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Where a sender is in the activation flow.
///
/// Typical path: Unknown → AwaitingActivation → Activated → Active. The
/// activation code can move a sender to `Activated` from any state, so the
/// order is a convention rather than an enforced invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderStatus {
    /// Never seen, or no entry in the registry.
    #[default]
    Unknown,
    /// Sent a payment screenshot, has not echoed the activation code yet.
    AwaitingActivation,
    /// Echoed the activation code.
    Activated,
    /// Activated and sent payment proof; has been given the group link.
    Active,
}

impl SenderStatus {
    /// Whether the sender has proven they hold the activation code.
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated | Self::Active)
    }
}

impl std::fmt::Display for SenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::AwaitingActivation => "awaiting_activation",
            Self::Activated => "activated",
            Self::Active => "active",
        };
        write!(f, "{s}")
    }
}

/// Status store keyed by sender id. Never fails.
#[async_trait]
pub trait SenderRegistry: Send + Sync {
    /// Current status, `Unknown` when the sender has no entry.
    async fn get(&self, sender: &str) -> SenderStatus;

    /// Record a status. Setting `Unknown` forgets the sender.
    async fn set(&self, sender: &str, status: SenderStatus);

    /// Number of senders with a recorded status.
    async fn tracked(&self) -> usize;
}

/// `HashMap`-backed registry.
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: RwLock<HashMap<String, SenderStatus>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SenderRegistry for InMemoryRegistry {
    async fn get(&self, sender: &str) -> SenderStatus {
        self.entries
            .read()
            .await
            .get(sender)
            .copied()
            .unwrap_or_default()
    }

    async fn set(&self, sender: &str, status: SenderStatus) {
        let mut entries = self.entries.write().await;
        match status {
            SenderStatus::Unknown => {
                entries.remove(sender);
            }
            status => {
                entries.insert(sender.to_string(), status);
            }
        }
    }

    async fn tracked(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unseen_sender_is_unknown() {
        let registry = InMemoryRegistry::new();
        assert_eq!(registry.get("whatsapp:+1555").await, SenderStatus::Unknown);
        assert_eq!(registry.tracked().await, 0);
    }

    #[tokio::test]
    async fn set_then_get() {
        let registry = InMemoryRegistry::new();
        registry.set("a", SenderStatus::AwaitingActivation).await;
        registry.set("b", SenderStatus::Active).await;
        assert_eq!(registry.get("a").await, SenderStatus::AwaitingActivation);
        assert_eq!(registry.get("b").await, SenderStatus::Active);
        assert_eq!(registry.tracked().await, 2);
    }

    #[tokio::test]
    async fn backward_moves_are_allowed() {
        let registry = InMemoryRegistry::new();
        registry.set("a", SenderStatus::Active).await;
        registry.set("a", SenderStatus::AwaitingActivation).await;
        assert_eq!(registry.get("a").await, SenderStatus::AwaitingActivation);
    }

    #[tokio::test]
    async fn setting_unknown_removes_entry() {
        let registry = InMemoryRegistry::new();
        registry.set("a", SenderStatus::Activated).await;
        registry.set("a", SenderStatus::Unknown).await;
        assert_eq!(registry.get("a").await, SenderStatus::Unknown);
        assert_eq!(registry.tracked().await, 0);
    }

    #[test]
    fn display_matches_serde() {
        use SenderStatus::*;
        for status in [Unknown, AwaitingActivation, Activated, Active] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(format!("\"{status}\""), json);
        }
    }

    #[test]
    fn activated_states() {
        assert!(!SenderStatus::Unknown.is_activated());
        assert!(!SenderStatus::AwaitingActivation.is_activated());
        assert!(SenderStatus::Activated.is_activated());
        assert!(SenderStatus::Active.is_activated());
    }
}
