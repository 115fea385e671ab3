//! Gateway — the conversation handler connecting the webhook, history,
//! schedule, completion provider, and side-effect collaborators.

mod pipeline;

#[cfg(test)]
mod tests;

use concierge_core::{
    config::{Prompts, RepliesConfig},
    traits::{AlertSender, HistoryStore, LeadLogger, Provider, ScheduleSource},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// History cleared, provider not called.
    Reset,
    /// Operator alerted, fixed escalation reply.
    Escalated,
    /// Missed lead recorded.
    LoggedMissed,
    /// Booking confirmed by the model; the calendar is left untouched.
    Booked { day: String, time: String },
    /// Ordinary reply.
    Plain,
    /// Provider failed or timed out; nothing persisted.
    Unavailable,
}

/// Reply text plus how it was produced.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
}

/// The conversation handler.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) store: Arc<dyn HistoryStore>,
    pub(super) schedule: Arc<dyn ScheduleSource>,
    pub(super) alerts: Arc<dyn AlertSender>,
    pub(super) leads: Arc<dyn LeadLogger>,
    pub(super) prompts: Prompts,
    pub(super) replies: RepliesConfig,
    /// Bound on the completion call and the escalation alert.
    pub(super) timeout: Duration,
    /// One lock per sender, held across load → complete → save.
    sender_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Gateway {
    /// Create a new gateway.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn HistoryStore>,
        schedule: Arc<dyn ScheduleSource>,
        alerts: Arc<dyn AlertSender>,
        leads: Arc<dyn LeadLogger>,
        prompts: Prompts,
        replies: RepliesConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            schedule,
            alerts,
            leads,
            prompts,
            replies,
            timeout,
            sender_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Name of the completion provider, for status output.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn provider_is_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Lock serializing requests from one sender.
    async fn sender_lock(&self, sender_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.sender_locks.lock().await;
        locks.entry(sender_id.to_string()).or_default().clone()
    }

    /// Give back a lock from `sender_lock`. The map entry is dropped once no
    /// request holds or waits on it.
    async fn release_sender_lock(&self, sender_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.sender_locks.lock().await;
        if locks
            .get(sender_id)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(sender_id);
        }
    }

    #[cfg(test)]
    async fn tracked_senders(&self) -> usize {
        self.sender_locks.lock().await.len()
    }
}

/// Whether `text` is the reset keyword (trimmed, case-insensitive).
pub(super) fn is_reset(text: &str, keyword: &str) -> bool {
    text.trim().to_lowercase() == keyword.trim().to_lowercase()
}
