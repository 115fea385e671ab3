//! Action markers the model emits inside its reply.
//!
//! The instruction prompt tells the model to append one of:
//! - `ACTION_ESCALATE` — a human must take over
//! - `ACTION_LOG_MISSED` — no slot fits, record the lost lead
//! - `ACTION_BOOK: Day|Time` — the customer confirmed a slot
//!
//! `parse_action` turns a raw reply into an [`Action`] carrying the text
//! the customer should see. Priority is escalate > missed > book.

pub const ESCALATE: &str = "ACTION_ESCALATE";
pub const LOG_MISSED: &str = "ACTION_LOG_MISSED";
pub const BOOK: &str = "ACTION_BOOK:";

/// What the handler should do with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Alert the operator; the model's text is not shown.
    Escalate,
    /// Log a missed lead and show `reply`.
    LogMissed { reply: String },
    /// A slot was confirmed; show `reply`.
    Book {
        reply: String,
        day: String,
        time: String,
    },
    /// No side effect; show the text as is.
    Plain(String),
}

/// Classify a raw completion.
pub fn parse_action(raw: &str) -> Action {
    if raw.contains(ESCALATE) {
        return Action::Escalate;
    }

    if raw.contains(LOG_MISSED) {
        return Action::LogMissed {
            reply: raw.replace(LOG_MISSED, "").trim().to_string(),
        };
    }

    if let Some(pos) = raw.find(BOOK) {
        let reply = raw[..pos].trim().to_string();
        return match parse_booking_payload(&raw[pos + BOOK.len()..]) {
            Some((day, time)) => Action::Book { reply, day, time },
            None => Action::Plain(reply),
        };
    }

    Action::Plain(raw.to_string())
}

/// Parse `Day|Time` from the text after the booking marker (first line only).
fn parse_booking_payload(after: &str) -> Option<(String, String)> {
    let line = after.lines().next()?.trim();
    let (day, time) = line.split_once('|')?;
    let (day, time) = (day.trim(), time.trim());
    if day.is_empty() || time.is_empty() {
        return None;
    }
    Some((day.to_string(), time.to_string()))
}
