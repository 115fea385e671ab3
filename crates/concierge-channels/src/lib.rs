//! # concierge-channels
//!
//! Messaging gateway integrations for Concierge: the Twilio inbound webhook
//! payload, the TwiML reply envelope, and operator SMS alerts.

pub mod twilio;
