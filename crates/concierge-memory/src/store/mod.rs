//! Keyed conversation history stores.
//!
//! - `json` — the whole mapping in one JSON file, rewritten on every put
//! - `sqlite` — one row per turn, a sender's rows replaced per put

mod json;
mod sqlite;


pub use json::{JsonFileStore, Threads};
pub use sqlite::SqliteStore;

use concierge_core::{
    config::{shellexpand, MemoryBackend, MemoryConfig},
    error::ConciergeError,
    traits::HistoryStore,
};
use std::sync::Arc;

/// Build the configured history store.
pub async fn open(config: &MemoryConfig) -> Result<Arc<dyn HistoryStore>, ConciergeError> {
    match config.backend {
        MemoryBackend::Json => Ok(Arc::new(JsonFileStore::new(shellexpand(
            &config.history_path,
        )))),
        MemoryBackend::Sqlite => Ok(Arc::new(
            SqliteStore::new(&shellexpand(&config.db_path)).await?,
        )),
    }
}
