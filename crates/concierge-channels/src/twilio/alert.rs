//! Operator SMS alerts via the Twilio Messages API.

use async_trait::async_trait;
use concierge_core::{config::AlertConfig, error::ConciergeError, traits::AlertSender};
use serde::Deserialize;
use tracing::{info, warn};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Credentials and numbers needed to send an alert.
#[derive(Debug, Clone)]
struct Credentials {
    account_sid: String,
    auth_token: String,
    from_number: String,
    operator_phone: String,
}

/// Sends "customer needs a human" SMS alerts to the operator.
///
/// Built from incomplete config it is a no-op: `alert` logs a warning and
/// returns `Ok(())`.
pub struct TwilioAlertSender {
    client: reqwest::Client,
    api_base: String,
    credentials: Option<Credentials>,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

impl TwilioAlertSender {
    pub fn new(config: &AlertConfig) -> Self {
        let credentials = config.is_complete().then(|| Credentials {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            operator_phone: config.operator_phone.clone(),
        });
        Self {
            client: reqwest::Client::new(),
            api_base: TWILIO_API_BASE.to_string(),
            credentials,
        }
    }

    /// Point at a different API host (tests, regional edges).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Text of the SMS sent to the operator.
pub(crate) fn alert_body(message: &str, sender_id: &str) -> String {
    format!("🚨 CONCIERGE ALERT 🚨\nCustomer {sender_id} needs help!\nMessage: \"{message}\"")
}

#[async_trait]
impl AlertSender for TwilioAlertSender {
    fn name(&self) -> &str {
        "twilio-sms"
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn alert(&self, message: &str, sender_id: &str) -> Result<(), ConciergeError> {
        let Some(creds) = &self.credentials else {
            warn!("alert: Twilio not configured, skipping SMS for {sender_id}");
            return Ok(());
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            creds.account_sid
        );
        let body = alert_body(message, sender_id);
        let form = [
            ("From", creds.from_number.as_str()),
            ("To", creds.operator_phone.as_str()),
            ("Body", body.as_str()),
        ];

        let resp = self
            .client
            .post(&url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&form[..])
            .send()
            .await
            .map_err(|e| ConciergeError::Channel(format!("twilio request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ConciergeError::Channel(format!(
                "twilio returned {status}: {text}"
            )));
        }

        let sid = resp
            .json::<MessageResource>()
            .await
            .ok()
            .and_then(|m| m.sid)
            .unwrap_or_else(|| "unknown".to_string());
        info!("alert: SMS sent to operator for {sender_id} (sid {sid})");
        Ok(())
    }
}
