//! Event processor — runs the activation rules for one inbound event and
//! dispatches the resulting messages.
//!
//! Flow:
//! 1. Reject events without a sender (nothing is touched)
//! 2. Under the sender's lock: read status, decide, write status
//! 3. Send every queued message concurrently, one attempt each
//!
//! Delivery failures are logged and reported in the outcome. They never
//! undo the status write and never fail the event.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::channels::{OutboundMessage, OutboundSender};
use crate::config::{BridgeConfig, DEFAULT_SEND_TIMEOUT_SECS};
use crate::error::{ChannelError, EventError};
use crate::pipeline::rules::decide;
use crate::pipeline::types::{Delivery, InboundEvent, ProcessOutcome};
use crate::registry::SenderRegistry;

/// Applies the activation rules and owns the dispatch contract.
pub struct EventProcessor {
    config: BridgeConfig,
    registry: Arc<dyn SenderRegistry>,
    sender: Arc<dyn OutboundSender>,
    send_timeout: Duration,
    /// One lock per sender with an event in flight. Serializes the
    /// read-modify-write on the registry for that sender only.
    sender_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EventProcessor {
    pub fn new(
        config: BridgeConfig,
        registry: Arc<dyn SenderRegistry>,
        sender: Arc<dyn OutboundSender>,
    ) -> Self {
        Self {
            config,
            registry,
            sender,
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
            sender_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Bound each outbound send; a send that exceeds it counts as failed.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<dyn SenderRegistry> {
        &self.registry
    }

    /// Process one inbound event.
    ///
    /// Only a missing sender is an error. Everything after that point,
    /// delivery failures included, yields `Ok`.
    pub async fn process(&self, mut event: InboundEvent) -> Result<ProcessOutcome, EventError> {
        event.sender = event.sender.trim().to_string();
        if event.sender.is_empty() {
            warn!(event_id = %event.id, "Rejecting inbound event without sender");
            return Err(EventError::MissingSender);
        }

        debug!(
            event_id = %event.id,
            sender = %event.sender,
            attachments = event.attachment_count,
            "Processing inbound event"
        );

        let (previous_status, decision) = {
            let guard = self.lock_sender(&event.sender).await;
            let previous = self.registry.get(&event.sender).await;
            let decision = decide(&event, previous, &self.config);
            if let Some(status) = decision.new_status {
                self.registry.set(&event.sender, status).await;
            }
            self.release_sender(&event.sender, guard).await;
            (previous, decision)
        };

        let deliveries = self.dispatch(&decision.messages).await;

        let outcome = ProcessOutcome {
            event_id: event.id,
            sender: event.sender,
            rule: decision.rule,
            previous_status,
            status: decision.new_status.unwrap_or(previous_status),
            deliveries,
        };

        info!(
            event_id = %outcome.event_id,
            sender = %outcome.sender,
            rule = outcome.rule.label(),
            from = %outcome.previous_status,
            to = %outcome.status,
            sent = outcome.deliveries.len(),
            failed = outcome.failed_deliveries(),
            "Inbound event processed"
        );

        Ok(outcome)
    }

    /// Attempt every message once, concurrently.
    async fn dispatch(&self, messages: &[OutboundMessage]) -> Vec<Delivery> {
        join_all(messages.iter().map(|msg| self.deliver(msg))).await
    }

    async fn deliver(&self, msg: &OutboundMessage) -> Delivery {
        let result =
            match tokio::time::timeout(self.send_timeout, self.sender.send(&msg.recipient, &msg.body))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ChannelError::Timeout {
                    name: self.sender.name().to_string(),
                    timeout: self.send_timeout,
                }),
            };

        match result {
            Ok(()) => {
                info!(to = %msg.recipient, channel = self.sender.name(), "Message sent");
                Delivery {
                    recipient: msg.recipient.clone(),
                    delivered: true,
                    error: None,
                }
            }
            Err(e) => {
                warn!(
                    to = %msg.recipient,
                    channel = self.sender.name(),
                    error = %e,
                    "Message delivery failed"
                );
                Delivery {
                    recipient: msg.recipient.clone(),
                    delivered: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn lock_sender(&self, sender: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.sender_locks.lock().await;
            Arc::clone(locks.entry(sender.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the guard and forget the lock if nobody else is waiting on it.
    async fn release_sender(&self, sender: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);
        let mut locks = self.sender_locks.lock().await;
        if locks.get(sender).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(sender);
        }
    }
}
