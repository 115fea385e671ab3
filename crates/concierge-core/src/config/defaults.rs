// --- Default value functions ---

pub(super) fn default_name() -> String {
    "Jay".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.concierge".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
pub(super) fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
pub(super) fn default_timeout_secs() -> u64 {
    30
}
pub(super) fn default_history_path() -> String {
    "~/.concierge/data/memory.json".to_string()
}
pub(super) fn default_db_path() -> String {
    "~/.concierge/data/memory.db".to_string()
}
pub(super) fn default_calendar_path() -> String {
    "~/.concierge/data/calendar.json".to_string()
}
pub(super) fn default_missed_path() -> String {
    "~/.concierge/data/missed_revenue.txt".to_string()
}
pub(super) fn default_api_host() -> String {
    "127.0.0.1".to_string()
}
pub(super) fn default_api_port() -> u16 {
    5000
}
pub(super) fn default_webhook_path() -> String {
    "/webhook".to_string()
}
pub(super) fn default_reset_keyword() -> String {
    "reset".to_string()
}
pub(super) fn default_reset_ack() -> String {
    "Memory cleared!".to_string()
}
pub(super) fn default_escalated() -> String {
    "I've alerted the team directly. Someone will contact you shortly.".to_string()
}
pub(super) fn default_unavailable() -> String {
    "Sorry, our system is currently updating. Please try again in a moment.".to_string()
}
