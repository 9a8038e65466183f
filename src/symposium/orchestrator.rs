//! The three-phase debate protocol for one task.
//!
//! ```text
//! Init ──▶ Responding ──▶ Critiquing ──▶ Refining ──▶ Done
//! ```
//!
//! Every phase produces exactly one output per agent, index-aligned with the
//! agent list, and no phase is skipped or reordered.  In Critiquing each
//! agent sees every *other* agent's initial answer; in Refining each agent
//! sees every *other* agent's critique.  An agent never sees its own prior
//! output in its own critique/refine input.
//!
//! A failed call never aborts the round: the failure is recorded as that
//! index's output (`Error: …`) and, under the default policy, flows into
//! later phases like ordinary content.
//!
//! # Example
//!
//! ```rust,no_run
//! use symposium::{AgentRegistry, Orchestrator, SymposiumConfig, Task};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SymposiumConfig::load("config.json");
//!     let mut agents = AgentRegistry::create_all(&config.agents)?;
//!
//!     let task = Task { request: "2+2?".into(), file_name: "t.log".into() };
//!     let orchestrator = Orchestrator::new(config.instructions.clone());
//!     let transcript = orchestrator
//!         .run_task(&mut agents, &task, |_phase, _outputs| {})
//!         .await;
//!     for output in &transcript.refined {
//!         println!("agent {}: {}", output.agent_index, output.text);
//!     }
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::symposium::agent::{Agent, AgentError};
use crate::symposium::config::Task;

/// Preamble of every critique prompt.
pub const CRITIQUE_PREAMBLE: &str =
    "Another model responded to the same question as follows. Find the flaws:";
/// Preamble of every refine prompt.
pub const REFINE_PREAMBLE: &str =
    "Other agents criticized your response as follows. Validate criticism and refine as needed:";

const CRITIQUE_LABEL: &str = "Response from another agent:";
const REFINE_LABEL: &str = "Criticism from another agent:";

/// The three ordered rounds of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Responding,
    Critiquing,
    Refining,
}

impl Phase {
    /// Heading written above this phase's output for one agent in the task
    /// log.
    pub fn section_label(self, agent_index: usize) -> String {
        match self {
            Phase::Responding => format!("Initial response from agent {}:", agent_index),
            Phase::Critiquing => format!("Critique by agent {}:", agent_index),
            Phase::Refining => format!("Refined response by agent {}:", agent_index),
        }
    }
}

/// What to do with an errored output when composing later prompts.
///
/// The phase record always keeps all N outputs either way; the policy only
/// controls what the *other* agents get to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Forward `Error: …` text into later prompts as ordinary content.
    PropagateAsContent,
    /// Omit errored outputs from the critique/refine bodies built for the
    /// other agents.
    ExcludeFromPrompts,
}

/// How the per-agent calls of one phase are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseExecution {
    /// One call at a time, in agent-list order.
    Sequential,
    /// Fan out all calls of the phase and join before the next phase starts.
    Parallel,
}

/// One agent's output for one phase.
#[derive(Clone, Debug)]
pub struct AgentOutput {
    pub agent_index: usize,
    pub text: String,
    /// True when `text` is the rendering of an [`AgentError`].
    pub errored: bool,
    pub timestamp: DateTime<Utc>,
}

/// Everything one task produced.
#[derive(Debug, Default)]
pub struct TaskTranscript {
    pub initial: Vec<AgentOutput>,
    pub critiques: Vec<AgentOutput>,
    pub refined: Vec<AgentOutput>,
    pub total_tokens: usize,
    /// True when a cancellation token stopped the task at a phase boundary.
    pub cancelled: bool,
}

/// Drives the three phases across the agent panel for a single task.
pub struct Orchestrator {
    /// Global instruction suffix appended to every initial prompt.
    instructions: String,
    error_policy: ErrorPolicy,
    execution: PhaseExecution,
    cancellation: Option<CancellationToken>,
}

impl Orchestrator {
    pub fn new(instructions: impl Into<String>) -> Self {
        Orchestrator {
            instructions: instructions.into(),
            error_policy: ErrorPolicy::PropagateAsContent,
            execution: PhaseExecution::Sequential,
            cancellation: None,
        }
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    pub fn with_execution(mut self, execution: PhaseExecution) -> Self {
        self.execution = execution;
        self
    }

    /// Attach a cancellation token checked at every phase boundary.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Run all three phases of `task` across `agents`.
    ///
    /// `on_phase` fires once per completed phase with that phase's
    /// index-aligned outputs; the task runner uses it to append to the log
    /// sink while the next phase is still pending.
    pub async fn run_task<F>(
        &self,
        agents: &mut [Agent],
        task: &Task,
        mut on_phase: F,
    ) -> TaskTranscript
    where
        F: FnMut(Phase, &[AgentOutput]),
    {
        let mut transcript = TaskTranscript::default();
        if agents.is_empty() {
            return transcript;
        }

        if self.is_cancelled() {
            transcript.cancelled = true;
            return transcript;
        }
        let initial_prompt = initial_prompt(&task.request, &self.instructions);
        let prompts = vec![initial_prompt; agents.len()];
        transcript.initial = self.run_phase(agents, prompts).await;
        transcript.total_tokens += usage_total(agents).await;
        on_phase(Phase::Responding, &transcript.initial);

        if self.is_cancelled() {
            transcript.cancelled = true;
            return transcript;
        }
        let prompts = (0..agents.len())
            .map(|i| critique_prompt(&transcript.initial, i, self.error_policy))
            .collect();
        transcript.critiques = self.run_phase(agents, prompts).await;
        transcript.total_tokens += usage_total(agents).await;
        on_phase(Phase::Critiquing, &transcript.critiques);

        if self.is_cancelled() {
            transcript.cancelled = true;
            return transcript;
        }
        let prompts = (0..agents.len())
            .map(|i| refine_prompt(&transcript.critiques, i, self.error_policy))
            .collect();
        transcript.refined = self.run_phase(agents, prompts).await;
        transcript.total_tokens += usage_total(agents).await;
        on_phase(Phase::Refining, &transcript.refined);

        transcript
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(|token| token.is_cancelled())
            .unwrap_or(false)
    }

    async fn run_phase(&self, agents: &mut [Agent], prompts: Vec<String>) -> Vec<AgentOutput> {
        match self.execution {
            PhaseExecution::Sequential => {
                let mut outputs = Vec::with_capacity(agents.len());
                for (index, (agent, prompt)) in
                    agents.iter_mut().zip(prompts.iter()).enumerate()
                {
                    let result = agent.respond(prompt).await;
                    outputs.push(output_from_result(index, result));
                }
                outputs
            }
            PhaseExecution::Parallel => {
                let calls = agents
                    .iter_mut()
                    .zip(prompts.iter())
                    .map(|(agent, prompt)| async move { agent.respond(prompt).await });
                join_all(calls)
                    .await
                    .into_iter()
                    .enumerate()
                    .map(|(index, result)| output_from_result(index, result))
                    .collect()
            }
        }
    }
}

fn output_from_result(agent_index: usize, result: Result<String, AgentError>) -> AgentOutput {
    match result {
        Ok(text) => AgentOutput {
            agent_index,
            text,
            errored: false,
            timestamp: Utc::now(),
        },
        Err(err) => AgentOutput {
            agent_index,
            text: err.to_content(),
            errored: true,
            timestamp: Utc::now(),
        },
    }
}

async fn usage_total(agents: &[Agent]) -> usize {
    let mut total = 0;
    for agent in agents {
        if let Some(usage) = agent.last_usage().await {
            total += usage.total_tokens;
        }
    }
    total
}

/// Prompt for the Responding phase: the task request plus the global
/// instruction suffix.
pub fn initial_prompt(request: &str, instructions: &str) -> String {
    if instructions.is_empty() {
        request.to_string()
    } else {
        format!("{}\n\n{}", request, instructions)
    }
}

/// Prompt for the Critiquing phase built for `agent_index` from the initial
/// outputs of every other agent.
pub fn critique_prompt(initial: &[AgentOutput], agent_index: usize, policy: ErrorPolicy) -> String {
    compose_phase_prompt(CRITIQUE_PREAMBLE, CRITIQUE_LABEL, initial, agent_index, policy)
}

/// Prompt for the Refining phase built for `agent_index` from the critiques
/// of every other agent.
pub fn refine_prompt(critiques: &[AgentOutput], agent_index: usize, policy: ErrorPolicy) -> String {
    compose_phase_prompt(REFINE_PREAMBLE, REFINE_LABEL, critiques, agent_index, policy)
}

// Self-exclusion happens here: agent_index's own entry is always filtered
// out.  With one agent (or everything filtered) the prompt is exactly the
// preamble, which is a valid degenerate case.
fn compose_phase_prompt(
    preamble: &str,
    label: &str,
    outputs: &[AgentOutput],
    agent_index: usize,
    policy: ErrorPolicy,
) -> String {
    let body = outputs
        .iter()
        .filter(|output| output.agent_index != agent_index)
        .filter(|output| policy == ErrorPolicy::PropagateAsContent || !output.errored)
        .map(|output| format!("{}\n{}", label, output.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    if body.is_empty() {
        preamble.to_string()
    } else {
        format!("{}\n\n{}", preamble, body)
    }
}
