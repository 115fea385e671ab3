//! # concierge-core
//!
//! Core types, traits, configuration, and error handling for the Concierge assistant.

pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod sanitize;
pub mod schedule;
pub mod traits;
