//! Message processing pipeline — the handle_message flow.

use super::{is_reset, Gateway, Outcome, Reply};
use crate::markers::{parse_action, Action};
use concierge_core::{
    context::{Context, Turn},
    message::IncomingMessage,
    sanitize,
};
use tracing::{error, info, warn};

impl Gateway {
    /// Process one inbound message and produce the reply for the sender.
    ///
    /// Never fails: every error path ends in a natural-language reply.
    pub async fn handle_message(&self, incoming: &IncomingMessage) -> Reply {
        let sender = incoming.sender_id.as_str();
        let preview = if incoming.text.chars().count() > 60 {
            let truncated: String = incoming.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            incoming.text.clone()
        };
        info!("{sender} says: {preview}");

        let lock = self.sender_lock(sender).await;
        let reply = {
            let _guard = lock.lock().await;
            self.process(incoming).await
        };
        self.release_sender_lock(sender, lock).await;
        reply
    }

    /// The pipeline proper; runs with the sender's lock held.
    async fn process(&self, incoming: &IncomingMessage) -> Reply {
        let sender = incoming.sender_id.as_str();

        // --- 1. LOAD HISTORY ---
        let history = match self.store.get(sender).await {
            Ok(h) => h,
            Err(e) => {
                warn!("history load failed for {sender}, starting empty: {e}");
                Vec::new()
            }
        };

        // --- 2. RESET ---
        if is_reset(&incoming.text, &self.replies.reset_keyword) {
            if let Err(e) = self.store.reset(sender).await {
                error!("history reset failed for {sender}: {e}");
            }
            info!("history cleared for {sender}");
            return Reply {
                text: self.replies.reset_ack.clone(),
                outcome: Outcome::Reset,
            };
        }

        // --- 3. PROMPT WITH LIVE AVAILABILITY ---
        let availability = self.schedule.snapshot().await.render();
        let system_prompt = self.prompts.render(&availability);

        // --- 4. APPEND USER TURN ---
        let flagged = sanitize::scan(&incoming.text);
        if !flagged.is_empty() {
            warn!("suspicious input from {sender}: {flagged:?}");
        }
        let mut context = Context::new(system_prompt, history);
        context.history.push(Turn::user(incoming.text.clone()));

        // --- 5. COMPLETE ---
        let raw = match tokio::time::timeout(self.timeout, self.provider.complete(&context)).await
        {
            Ok(Ok(response)) => {
                let meta = &response.metadata;
                info!(
                    "{sender}: {} answered in {}ms (model {}, tokens {})",
                    meta.provider_used,
                    meta.processing_time_ms,
                    meta.model.as_deref().unwrap_or("unknown"),
                    meta.tokens_used
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "n/a".to_string()),
                );
                response.text
            }
            Ok(Err(e)) => {
                error!("completion failed for {sender}: {e}");
                return self.unavailable();
            }
            Err(_) => {
                error!(
                    "completion for {sender} timed out after {}s",
                    self.timeout.as_secs()
                );
                return self.unavailable();
            }
        };

        // --- 6. DISPATCH ON MARKERS ---
        let (text, outcome) = match parse_action(&raw) {
            Action::Escalate => {
                self.escalate(&incoming.text, sender).await;
                (self.replies.escalated.clone(), Outcome::Escalated)
            }
            Action::LogMissed { reply } => {
                if let Err(e) = self.leads.log_missed(sender).await {
                    warn!("missed-lead log failed for {sender}: {e}");
                }
                (reply, Outcome::LoggedMissed)
            }
            Action::Book { reply, day, time } => {
                info!("booking confirmed for {sender}: {day} {time} (calendar not updated)");
                (reply, Outcome::Booked { day, time })
            }
            Action::Plain(reply) => (reply, Outcome::Plain),
        };

        // --- 7. PERSIST ---
        let mut history = context.history;
        history.push(Turn::assistant(text.clone()));
        if let Err(e) = self.store.put(sender, &history).await {
            error!("history save failed for {sender}, reply still sent: {e}");
        }

        Reply { text, outcome }
    }

    /// Best-effort operator alert, bounded by the request timeout.
    async fn escalate(&self, message: &str, sender: &str) {
        if !self.alerts.is_configured() {
            warn!(
                "escalation for {sender} but {} is not configured",
                self.alerts.name()
            );
        }
        match tokio::time::timeout(self.timeout, self.alerts.alert(message, sender)).await {
            Ok(Ok(())) => info!("escalated {sender} via {}", self.alerts.name()),
            Ok(Err(e)) => warn!("alert delivery failed for {sender}: {e}"),
            Err(_) => warn!("alert delivery for {sender} timed out"),
        }
    }

    fn unavailable(&self) -> Reply {
        Reply {
            text: self.replies.unavailable.clone(),
            outcome: Outcome::Unavailable,
        }
    }
}
