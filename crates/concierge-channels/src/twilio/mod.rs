//! Twilio (WhatsApp / SMS) gateway.

mod alert;
mod twiml;

pub use alert::TwilioAlertSender;
pub use twiml::{escape_xml, message_response, CONTENT_TYPE};

use serde::Deserialize;

/// Form fields Twilio posts to the inbound webhook.
///
/// Twilio sends many more fields; only these two are used. Missing fields
/// deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}
