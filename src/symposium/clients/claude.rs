//! Anthropic Claude client wrapper speaking the native Messages API.
//!
//! Use this module when a descriptor resolves to the Claude family.  The
//! Messages API has its own request shape (a separate `system` field, a
//! required `max_tokens`, `x-api-key` authentication), so this wrapper builds
//! its requests directly on the shared HTTP client instead of going through
//! the chat-completion transport.
//!
//! # Example
//!
//! ```rust,no_run
//! use symposium::client_wrapper::{ClientWrapper, Message, Role};
//! use symposium::clients::claude::ClaudeClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let key = std::env::var("ANTHROPIC_API_KEY")?;
//!     let client = ClaudeClient::new_with_model_str(&key, "claude-sonnet-4-5");
//!     let reply = client
//!         .send_message(&[Message {
//!             role: Role::User,
//!             content: "List three Claude capabilities.".into(),
//!         }])
//!         .await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::symposium::client_wrapper::{ClientWrapper, Message, Role, SendError, TokenUsage};
use crate::symposium::clients::common::get_shared_http_client;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Completion budget sent with every request; the Messages API requires one.
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Client wrapper for Anthropic's Messages API.
pub struct ClaudeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    token_usage: Mutex<Option<TokenUsage>>,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct WireUsage {
    input_tokens: u64,
    output_tokens: u64,
}

impl ClaudeClient {
    /// Create a client from an API key and explicit model string.
    pub fn new_with_model_str(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, DEFAULT_BASE_URL)
    }

    /// Create a client pointing at a custom Claude-compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        ClaudeClient {
            http: get_shared_http_client().clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: secret_key.to_string(),
            model: model_name.to_string(),
            temperature: 1.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            token_usage: Mutex::new(None),
        }
    }

    /// Set the sampling temperature used for every request.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the per-request completion budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ClientWrapper for ClaudeClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(&self, messages: &[Message]) -> Result<Message, SendError> {
        // The Messages API takes system text out-of-band; only user/assistant
        // turns are allowed in `messages`.
        let mut system_parts: Vec<&str> = Vec::new();
        let mut wire_messages = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                Role::System => system_parts.push(message.content.as_str()),
                Role::User => wire_messages.push(WireMessage {
                    role: "user",
                    content: message.content.clone(),
                }),
                Role::Assistant => wire_messages.push(WireMessage {
                    role: "assistant",
                    content: message.content.clone(),
                }),
            }
        }

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: if system_parts.is_empty() {
                None
            } else {
                Some(system_parts.join("\n\n"))
            },
            messages: wire_messages,
        };

        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!(
                "ClaudeClient::send_message(...): Anthropic API error {}: {}",
                status,
                body
            );
            return Err(format!("Anthropic API error {}: {}", status, body).into());
        }

        let parsed: MessagesResponse = response.json().await?;

        if let Some(usage) = parsed.usage {
            *self.token_usage.lock().await = Some(TokenUsage {
                input_tokens: usage.input_tokens as usize,
                output_tokens: usage.output_tokens as usize,
                total_tokens: (usage.input_tokens + usage.output_tokens) as usize,
            });
        }

        let text = parsed
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.trim().to_string())
            .ok_or_else(|| -> SendError {
                "Anthropic response contained no text content".into()
            })?;

        Ok(Message {
            role: Role::Assistant,
            content: text,
        })
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
