//! The `OpenAIClient` struct implements `ClientWrapper` for chat-completion
//! style APIs (OpenAI and OpenAI-compatible endpoints), capturing both the
//! assistant response and token usage for cost tracking.
//!
//! # Example
//!
//! ```rust,no_run
//! use symposium::client_wrapper::{ClientWrapper, Message, Role};
//! use symposium::clients::openai::OpenAIClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let secret_key = std::env::var("OPENAI_API_KEY")?;
//!     let client = OpenAIClient::new_with_model_str(&secret_key, "gpt-4o");
//!
//!     let resp = client
//!         .send_message(&[
//!             Message { role: Role::System, content: "You are terse.".into() },
//!             Message { role: Role::User, content: "Hello!".into() },
//!         ])
//!         .await?;
//!     println!("Assistant: {}", resp.content);
//!
//!     if let Some(usage) = client.get_last_usage().await {
//!         println!("Tokens spent: {}", usage.total_tokens);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use openai_rust::chat;
use openai_rust2 as openai_rust;
use tokio::sync::Mutex;

use crate::symposium::client_wrapper::{ClientWrapper, Message, Role, SendError, TokenUsage};
use crate::symposium::clients::common::{get_shared_http_client, send_and_track};

/// Default sampling temperature when the descriptor does not override it.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Client wrapper for OpenAI's Chat Completions API.
///
/// The wrapper maintains the selected model identifier plus an internal
/// [`TokenUsage`] slot so callers can inspect how many tokens each request
/// consumed.  It reuses the shared HTTP client configured in
/// [`crate::symposium::clients::common`].
pub struct OpenAIClient {
    /// Underlying SDK client pointing at the REST endpoint.
    client: openai_rust::Client,
    /// Model name that will be injected into each request.
    model: String,
    /// Sampling temperature injected into each request.
    temperature: f32,
    /// Storage for the token usage returned by the most recent request.
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAIClient {
    /// Construct a new client using the provided API key and model name.
    ///
    /// This is the most general constructor and can be used for unofficial
    /// model identifiers (e.g. OpenAI compatible self-hosted deployments).
    pub fn new_with_model_str(secret_key: &str, model_name: &str) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client(
                secret_key,
                get_shared_http_client().clone(),
            ),
            model: model_name.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            token_usage: Mutex::new(None),
        }
    }

    /// Construct a client targeting a custom OpenAI compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client_and_base_url(
                secret_key,
                get_shared_http_client().clone(),
                base_url,
            ),
            model: model_name.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            token_usage: Mutex::new(None),
        }
    }

    /// Set the sampling temperature used for every request.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(&self, messages: &[Message]) -> Result<Message, SendError> {
        // Convert the provided messages into the format expected by openai_rust
        let mut formatted_messages = Vec::with_capacity(messages.len());
        for msg in messages {
            formatted_messages.push(chat::Message {
                role: match msg.role {
                    Role::System => "system".to_owned(),
                    Role::User => "user".to_owned(),
                    Role::Assistant => "assistant".to_owned(),
                },
                content: msg.content.clone(),
            });
        }

        let url_path_string = "/v1/chat/completions".to_string();

        let content = send_and_track(
            &self.client,
            &self.model,
            self.temperature,
            formatted_messages,
            Some(url_path_string),
            &self.token_usage,
        )
        .await?;

        Ok(Message {
            role: Role::Assistant,
            content,
        })
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
