//! # concierge-providers
//!
//! Completion provider implementations for Concierge.

pub mod openai;

pub use openai::OpenAiProvider;
