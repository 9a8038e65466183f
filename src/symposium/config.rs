//! Configuration for a symposium run.
//!
//! A run is described by a JSON document with three top-level keys:
//!
//! ```json
//! {
//!   "MODELS": [{"model_name": "gpt-4o"}, {"model_name": "claude-sonnet-4-5"}],
//!   "TASKS": [{"request": "2+2?", "file_name": "t.log"}],
//!   "CONFIG": {"instructions": "Be brief"}
//! }
//! ```
//!
//! Loading is deliberately permissive: a missing or unparseable file degrades
//! to an empty configuration with zero agents and zero tasks, so the run
//! becomes a no-op instead of aborting.  Credential problems, by contrast,
//! are fatal and surface from the registry.
//!
//! # Example
//!
//! ```rust
//! use symposium::{ProviderFamily, SymposiumConfig};
//!
//! let config = SymposiumConfig::from_json(
//!     r#"{"MODELS": [{"model_name": "claude-sonnet-4-5"}]}"#,
//! )
//! .unwrap();
//! assert_eq!(config.agents.len(), 1);
//! assert_eq!(config.agents[0].family, ProviderFamily::Claude);
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// System prompt used when a model entry does not provide one.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant.";

/// Backend family a model descriptor resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderFamily {
    /// Chat-completion-style APIs (OpenAI and compatible endpoints).
    OpenAi,
    /// Anthropic's messages-style API.
    Claude,
}

impl ProviderFamily {
    /// Resolve the family from a model identifier with a case-insensitive
    /// substring check.  Anything that is not recognizably Claude gets the
    /// OpenAI-style client; that default is intentional and lets
    /// OpenAI-compatible deployments run without their own family.
    pub fn from_model_id(model_id: &str) -> Self {
        if model_id.to_lowercase().contains("claude") {
            ProviderFamily::Claude
        } else {
            ProviderFamily::OpenAi
        }
    }

    /// Environment variable holding this family's API credential.
    pub fn credential_variable(self) -> &'static str {
        match self {
            ProviderFamily::OpenAi => "OPENAI_API_KEY",
            ProviderFamily::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFamily::OpenAi => write!(f, "OpenAI-style"),
            ProviderFamily::Claude => write!(f, "Claude-style"),
        }
    }
}

/// Immutable description of one participating model, resolved at load time.
#[derive(Clone, Debug)]
pub struct AgentDescriptor {
    pub family: ProviderFamily,
    pub model_id: String,
    pub temperature: f32,
    /// Per-model system prompt.
    pub instructions: String,
}

/// One unit of work: a question for the panel and the log file its debate
/// lands in.
#[derive(Clone, Debug)]
pub struct Task {
    pub request: String,
    pub file_name: String,
}

/// Error raised by the strict loading path.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "could not read configuration: {}", err),
            ConfigError::Parse(err) => write!(f, "could not parse configuration: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_temperature() -> f32 {
    1.0
}

fn default_model_instructions() -> String {
    DEFAULT_INSTRUCTIONS.to_string()
}

// Wire shape of the JSON document; resolved into the public types below.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "MODELS", default)]
    models: Vec<RawModel>,
    #[serde(rename = "TASKS", default)]
    tasks: Vec<RawTask>,
    #[serde(rename = "CONFIG", default)]
    config: RawGlobal,
}

#[derive(Deserialize)]
struct RawModel {
    model_name: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_model_instructions")]
    instructions: String,
}

#[derive(Deserialize)]
struct RawTask {
    request: String,
    file_name: String,
}

#[derive(Deserialize, Default)]
struct RawGlobal {
    #[serde(default)]
    instructions: String,
}

/// Fully resolved configuration handed to the registry and task runner.
#[derive(Clone, Debug, Default)]
pub struct SymposiumConfig {
    pub agents: Vec<AgentDescriptor>,
    pub tasks: Vec<Task>,
    /// Global instruction suffix appended to every initial prompt.
    pub instructions: String,
}

impl SymposiumConfig {
    /// Load a configuration file, degrading to empty defaults when the file
    /// is missing or malformed.  The degradation is logged, never raised.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(
                    "symposium: could not load configuration from {}: {}; continuing with empty defaults",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Strict variant of [`SymposiumConfig::load`].
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&text)
    }

    /// Parse a configuration from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawDocument = serde_json::from_str(text).map_err(ConfigError::Parse)?;

        let agents = raw
            .models
            .into_iter()
            .map(|model| {
                let family = ProviderFamily::from_model_id(&model.model_name);
                AgentDescriptor {
                    family,
                    model_id: model.model_name,
                    temperature: model.temperature,
                    instructions: model.instructions,
                }
            })
            .collect();

        let tasks = raw
            .tasks
            .into_iter()
            .map(|task| Task {
                request: task.request,
                file_name: task.file_name,
            })
            .collect();

        Ok(SymposiumConfig {
            agents,
            tasks,
            instructions: raw.config.instructions,
        })
    }
}
