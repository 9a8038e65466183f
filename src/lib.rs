//! # Symposium
//!
//! Symposium is a multi-agent debate orchestrator: it sends a task prompt to
//! several language-model backends, collects their initial answers, has each
//! agent critique the others' answers, then has each agent refine its own
//! answer based on the received criticism.
//!
//! The crate provides layered abstractions for:
//!
//! * **Provider Flexibility**: the [`ClientWrapper`] trait implemented for
//!   OpenAI-style chat-completion endpoints and Anthropic's messages-style
//!   API, with shared connection pooling and token accounting
//! * **Agents**: an [`Agent`] binds one configured model to a backend client
//!   and carries the conversation across the three phases of a task
//! * **Three-Phase Orchestration**: the [`Orchestrator`] drives
//!   Responding → Critiquing → Refining across the panel with stable agent
//!   indices, per-agent failure isolation, and optional per-phase fan-out
//! * **Task Running**: the [`TaskRunner`] iterates configured tasks and
//!   appends every completed phase to a per-task append-only log
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use symposium::{AgentRegistry, FileLogSink, Orchestrator, SymposiumConfig, TaskRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     symposium::init_logger();
//!
//!     // Missing or malformed configuration degrades to an empty run.
//!     let config = SymposiumConfig::load("config.json");
//!
//!     // Credentials come from OPENAI_API_KEY / ANTHROPIC_API_KEY; a missing
//!     // credential for a configured family aborts the run here.
//!     let mut agents = AgentRegistry::create_all(&config.agents)?;
//!
//!     let orchestrator = Orchestrator::new(config.instructions.clone());
//!     let runner = TaskRunner::new(orchestrator, Arc::new(FileLogSink::default()));
//!     let summary = runner.run_all(&mut agents, &config.tasks).await;
//!     println!("ran {} task(s)", summary.tasks_run);
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding
/// Symposium can opt in to simple `RUST_LOG` driven diagnostics without
/// having to choose a specific logging backend upfront.
///
/// ```rust
/// symposium::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `symposium` module.
pub mod symposium;

// Re-exporting key items for easier external access.
pub use crate::symposium::agent::{Agent, AgentError, DEFAULT_CALL_TIMEOUT};
pub use crate::symposium::client_wrapper;
pub use crate::symposium::client_wrapper::{ClientWrapper, Message, Role, SendError, TokenUsage};
pub use crate::symposium::clients;
pub use crate::symposium::config::{
    AgentDescriptor, ConfigError, ProviderFamily, SymposiumConfig, Task, DEFAULT_INSTRUCTIONS,
};
pub use crate::symposium::log_sink::{FileLogSink, LogSink};
pub use crate::symposium::orchestrator::{
    AgentOutput, ErrorPolicy, Orchestrator, Phase, PhaseExecution, TaskTranscript,
    CRITIQUE_PREAMBLE, REFINE_PREAMBLE,
};
pub use crate::symposium::registry::{AgentRegistry, RegistryError};
pub use crate::symposium::runner::{RunSummary, TaskRunner};
