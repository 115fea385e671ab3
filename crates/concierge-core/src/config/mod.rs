mod defaults;
mod prompts;


pub use prompts::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ConciergeError;
use defaults::*;

/// Top-level Concierge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub concierge: ConciergeConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub leads: LeadsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
}

/// General assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConciergeConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// OpenAI-compatible completion service (Groq by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound for one completion call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Twilio credentials for operator SMS alerts.
///
/// Any empty field turns alerting into a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    /// Twilio number alerts are sent from.
    #[serde(default)]
    pub from_number: String,
    /// Operator number alerts are sent to.
    #[serde(default)]
    pub operator_phone: String,
}

impl AlertConfig {
    pub fn is_complete(&self) -> bool {
        !self.account_sid.is_empty()
            && !self.auth_token.is_empty()
            && !self.from_number.is_empty()
            && !self.operator_phone.is_empty()
    }
}

/// History store backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryBackend {
    /// Single JSON file keyed by sender (default).
    #[default]
    Json,
    /// SQLite database, one row per turn.
    Sqlite,
}

/// Memory config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub backend: MemoryBackend,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: MemoryBackend::default(),
            history_path: default_history_path(),
            db_path: default_db_path(),
        }
    }
}

/// Calendar file holding open slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_calendar_path")]
    pub calendar_path: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            calendar_path: default_calendar_path(),
        }
    }
}

/// Missed-lead log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadsConfig {
    #[serde(default = "default_missed_path")]
    pub missed_path: String,
}

impl Default for LeadsConfig {
    fn default() -> Self {
        Self {
            missed_path: default_missed_path(),
        }
    }
}

/// Webhook server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

/// Fixed user-facing replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepliesConfig {
    /// Message body (trimmed, case-insensitive) that clears history.
    #[serde(default = "default_reset_keyword")]
    pub reset_keyword: String,
    #[serde(default = "default_reset_ack")]
    pub reset_ack: String,
    #[serde(default = "default_escalated")]
    pub escalated: String,
    #[serde(default = "default_unavailable")]
    pub unavailable: String,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            reset_keyword: default_reset_keyword(),
            reset_ack: default_reset_ack(),
            escalated: default_escalated(),
            unavailable: default_unavailable(),
        }
    }
}

impl Config {
    /// Overlay values from environment variables.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(k))
                .find(|v| !v.trim().is_empty())
        };

        if let Some(v) = get(&["CONCIERGE_API_KEY", "GROQ_API_KEY"]) {
            self.provider.api_key = v;
        }
        if let Some(v) = get(&["CONCIERGE_MODEL"]) {
            self.provider.model = v;
        }
        if let Some(v) = get(&["TWILIO_ACCOUNT_SID"]) {
            self.alert.account_sid = v;
        }
        if let Some(v) = get(&["TWILIO_AUTH_TOKEN"]) {
            self.alert.auth_token = v;
        }
        if let Some(v) = get(&["TWILIO_PHONE_NUMBER"]) {
            self.alert.from_number = v;
        }
        if let Some(v) = get(&["OPERATOR_PHONE", "DOCTOR_PHONE"]) {
            self.alert.operator_phone = v;
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, ConciergeError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConciergeError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| ConciergeError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
