//! Factory mapping agent descriptors to concrete backend clients.
//!
//! The family's credential is read from the environment once per
//! construction.  An absent credential makes that agent un-constructible,
//! which aborts the whole run: a panel missing a configured member would
//! silently change the debate.

use std::env;
use std::fmt;
use std::sync::Arc;

use crate::symposium::agent::Agent;
use crate::symposium::client_wrapper::ClientWrapper;
use crate::symposium::clients::claude::ClaudeClient;
use crate::symposium::clients::openai::OpenAIClient;
use crate::symposium::config::{AgentDescriptor, ProviderFamily};

#[derive(Debug)]
pub enum RegistryError {
    /// The environment variable for the descriptor's family is unset or empty.
    MissingCredential {
        family: ProviderFamily,
        variable: &'static str,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::MissingCredential { family, variable } => write!(
                f,
                "missing credential for {} agents: environment variable {} is not set",
                family, variable
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

pub struct AgentRegistry;

impl AgentRegistry {
    /// Build one agent for `descriptor`, selecting the client variant from
    /// the family resolved at configuration load.
    pub fn create(descriptor: &AgentDescriptor) -> Result<Agent, RegistryError> {
        let variable = descriptor.family.credential_variable();
        let secret = env::var(variable)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or(RegistryError::MissingCredential {
                family: descriptor.family,
                variable,
            })?;

        let client: Arc<dyn ClientWrapper> = match descriptor.family {
            ProviderFamily::OpenAi => Arc::new(
                OpenAIClient::new_with_model_str(&secret, &descriptor.model_id)
                    .with_temperature(descriptor.temperature),
            ),
            ProviderFamily::Claude => Arc::new(
                ClaudeClient::new_with_model_str(&secret, &descriptor.model_id)
                    .with_temperature(descriptor.temperature),
            ),
        };

        log::info!(
            "symposium: registered {} agent for model {}",
            descriptor.family,
            descriptor.model_id
        );
        Ok(Agent::new(descriptor.clone(), client))
    }

    /// Build the whole panel, failing on the first un-constructible agent.
    pub fn create_all(descriptors: &[AgentDescriptor]) -> Result<Vec<Agent>, RegistryError> {
        descriptors.iter().map(Self::create).collect()
    }
}
