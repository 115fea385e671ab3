use crate::{
    context::{Context, History},
    error::ConciergeError,
    message::OutgoingMessage,
    schedule::ScheduleSnapshot,
};
use async_trait::async_trait;

/// Completion provider trait — the brain.
///
/// Every chat-completion backend implements this trait to provide a
/// uniform interface to the conversation handler.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider requires an API key to function.
    fn requires_api_key(&self) -> bool;

    /// Send a conversation context to the provider and get a response.
    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, ConciergeError>;

    /// Check if the provider is available and ready.
    async fn is_available(&self) -> bool;
}

/// Keyed conversation history store.
///
/// Backends decide how `put` is made durable; callers rely on `put`
/// replacing the sender's whole history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Backend name for status output.
    fn name(&self) -> &str;

    /// Load one sender's history. Unknown senders yield an empty history.
    async fn get(&self, sender_id: &str) -> Result<History, ConciergeError>;

    /// Replace one sender's history.
    async fn put(&self, sender_id: &str, history: &History) -> Result<(), ConciergeError>;

    /// Clear one sender's history; `get` returns an empty history afterward.
    ///
    /// The default stores an empty list under the key.
    async fn reset(&self, sender_id: &str) -> Result<(), ConciergeError> {
        self.put(sender_id, &Vec::new()).await
    }
}

/// Source of live availability.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Read the current schedule. Never fails; problems map to a sentinel.
    async fn snapshot(&self) -> ScheduleSnapshot;
}

/// Out-of-band operator notification.
#[async_trait]
pub trait AlertSender: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Whether alerts will actually be delivered.
    fn is_configured(&self) -> bool;

    /// Notify the operator that `sender_id` needs a human.
    async fn alert(&self, message: &str, sender_id: &str) -> Result<(), ConciergeError>;
}

/// Append-only record of leads the business could not serve.
#[async_trait]
pub trait LeadLogger: Send + Sync {
    async fn log_missed(&self, sender_id: &str) -> Result<(), ConciergeError>;
}
