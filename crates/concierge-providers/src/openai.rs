//! OpenAI-compatible chat completions provider.
//!
//! Works with Groq (the default endpoint), OpenAI, and any compatible server.

use async_trait::async_trait;
use concierge_core::{
    config::ProviderConfig,
    context::{ApiMessage, Context},
    error::ConciergeError,
    message::{MessageMetadata, OutgoingMessage},
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Create from config values.
    pub fn from_config(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    /// Create from the `[provider]` config section.
    pub fn new(config: &ProviderConfig) -> Self {
        Self::from_config(
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )
    }

    /// Default model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Build OpenAI-format messages from context (system as a message role).
fn build_openai_messages(system: &str, api_messages: &[ApiMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(api_messages.len() + 1);
    if !system.is_empty() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: Some(system.to_string()),
        });
    }
    for m in api_messages {
        messages.push(ChatMessage {
            role: m.role.clone(),
            content: Some(m.content.clone()),
        });
    }
    messages
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: Option<u64>,
}

/// Pull the first choice's content out of a parsed response.
fn first_content(parsed: &ChatCompletionResponse) -> Option<String> {
    parsed
        .choices
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.clone())
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, ConciergeError> {
        let (system, api_messages) = context.to_api_messages();
        let start = Instant::now();

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_openai_messages(&system, &api_messages),
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("openai: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConciergeError::Provider(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ConciergeError::Provider(format!(
                "openai returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp.json().await.map_err(|e| {
            ConciergeError::Provider(format!("openai: failed to parse response: {e}"))
        })?;

        let text = first_content(&parsed).ok_or_else(|| {
            ConciergeError::Provider("openai: response had no message content".to_string())
        })?;

        let tokens = parsed.usage.as_ref().and_then(|u| u.total_tokens);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        Ok(OutgoingMessage {
            text,
            metadata: MessageMetadata {
                provider_used: "openai".to_string(),
                tokens_used: tokens,
                processing_time_ms: elapsed_ms,
                model: parsed.model,
            },
        })
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("openai: no API key configured");
            return false;
        }
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("openai not available: {e}");
                false
            }
        }
    }
}
