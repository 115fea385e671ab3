//! # concierge-memory
//!
//! Persistence for Concierge: per-sender conversation history (JSON file or
//! SQLite), the calendar file that feeds live availability, and the
//! missed-lead log.

pub mod leads;
pub mod schedule;
pub mod store;

pub use leads::MissedLeadLog;
pub use schedule::CalendarFile;
pub use store::{open, JsonFileStore, SqliteStore};
