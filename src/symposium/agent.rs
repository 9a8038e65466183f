//! One debate participant: a descriptor bound to a backend client plus the
//! conversation carried across the three phases of the current task.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::symposium::client_wrapper::{ClientWrapper, Message, Role, TokenUsage};
use crate::symposium::config::AgentDescriptor;

/// Upper bound on a single backend call; expiry is an agent-level error, not
/// an abort of the round.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Error produced by a single `respond()` call.
#[derive(Debug)]
pub enum AgentError {
    /// Any transport, rate-limit, or malformed-response failure reported by
    /// the backend client.
    Backend(String),
    /// The call did not finish within the configured bound.
    Timeout(Duration),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Backend(msg) => write!(f, "{}", msg),
            AgentError::Timeout(limit) => {
                write!(f, "call timed out after {}s", limit.as_secs())
            }
        }
    }
}

impl std::error::Error for AgentError {}

impl AgentError {
    /// Render the error the way it flows into phase outputs and, under the
    /// default policy, into the other agents' later prompts.
    pub fn to_content(&self) -> String {
        format!("Error: {}", self)
    }
}

/// A runtime agent bound to one [`AgentDescriptor`].
///
/// The agent owns the conversation state accumulated across the phases of
/// one task.  The task runner calls [`Agent::reset`] at task start, so a new
/// task never sees the previous task's conversation.
pub struct Agent {
    descriptor: AgentDescriptor,
    client: Arc<dyn ClientWrapper>,
    history: Vec<Message>,
    call_timeout: Duration,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("model_id", &self.descriptor.model_id)
            .field("history_len", &self.history.len())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl Agent {
    pub fn new(descriptor: AgentDescriptor, client: Arc<dyn ClientWrapper>) -> Self {
        Agent {
            descriptor,
            client,
            history: Vec::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub fn model_id(&self) -> &str {
        &self.descriptor.model_id
    }

    /// Drop the conversation carried across the phases of the current task.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Send `prompt` as the next user turn and return the assistant's reply.
    ///
    /// The request is assembled as system prompt + prior task turns + the new
    /// prompt.  On success both the prompt and the reply are appended to the
    /// task history so later phases see the agent's own earlier turns.
    pub async fn respond(&mut self, prompt: &str) -> Result<String, AgentError> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message {
            role: Role::System,
            content: self.descriptor.instructions.clone(),
        });
        messages.extend(self.history.iter().cloned());
        messages.push(Message {
            role: Role::User,
            content: prompt.to_string(),
        });

        let reply =
            match tokio::time::timeout(self.call_timeout, self.client.send_message(&messages))
                .await
            {
                Ok(Ok(reply)) => reply,
                Ok(Err(err)) => {
                    log::warn!(
                        "symposium: agent {}: backend call failed: {}",
                        self.descriptor.model_id,
                        err
                    );
                    return Err(AgentError::Backend(err.to_string()));
                }
                Err(_) => {
                    log::warn!(
                        "symposium: agent {}: call exceeded {}s",
                        self.descriptor.model_id,
                        self.call_timeout.as_secs()
                    );
                    return Err(AgentError::Timeout(self.call_timeout));
                }
            };

        self.history.push(Message {
            role: Role::User,
            content: prompt.to_string(),
        });
        self.history.push(reply.clone());
        Ok(reply.content)
    }

    /// Usage recorded by the client for its most recent call, if any.
    pub async fn last_usage(&self) -> Option<TokenUsage> {
        self.client.get_last_usage().await
    }
}
