//! Whole-file JSON history store.

use async_trait::async_trait;
use concierge_core::{context::History, error::ConciergeError, traits::HistoryStore};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Every sender's history, as persisted.
pub type Threads = BTreeMap<String, History>;

/// History store backed by a single JSON file.
///
/// Reads fail open: a missing or corrupt file is an empty mapping. Writes
/// go through a temp file and a rename, serialized by an in-process lock
/// so two requests in this process never lose each other's updates.
/// Separate processes sharing the file still race, last write wins.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping, degrading to empty on any failure.
    pub async fn load_all(&self) -> Threads {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Threads::new(),
            Err(e) => {
                warn!("history: failed to read {}: {e}", self.path.display());
                return Threads::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(threads) => threads,
            Err(e) => {
                warn!(
                    "history: {} is corrupt, starting empty: {e}",
                    self.path.display()
                );
                Threads::new()
            }
        }
    }

    /// Overwrite the whole mapping.
    pub async fn save_all(&self, threads: &Threads) -> Result<(), ConciergeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(threads)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(
            "history: saved {} sender(s) to {}",
            threads.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn get(&self, sender_id: &str) -> Result<History, ConciergeError> {
        Ok(self.load_all().await.remove(sender_id).unwrap_or_default())
    }

    async fn put(&self, sender_id: &str, history: &History) -> Result<(), ConciergeError> {
        let _guard = self.write_lock.lock().await;
        let mut threads = self.load_all().await;
        threads.insert(sender_id.to_string(), history.clone());
        self.save_all(&threads).await
    }
}
