//! Missed-lead log — one line per customer turned away for lack of slots.

use async_trait::async_trait;
use concierge_core::{error::ConciergeError, traits::LeadLogger};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Append-only text log of missed leads.
pub struct MissedLeadLog {
    path: PathBuf,
}

impl MissedLeadLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Format one log line.
fn format_entry(timestamp: &str, sender_id: &str) -> String {
    format!("[{timestamp}] Lost lead: {sender_id} (No Slots)\n")
}

#[async_trait]
impl LeadLogger for MissedLeadLog {
    async fn log_missed(&self, sender_id: &str) -> Result<(), ConciergeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format_entry(&timestamp, sender_id).as_bytes())
            .await?;
        file.flush().await?;

        info!("missed lead logged for {sender_id}");
        Ok(())
    }
}
