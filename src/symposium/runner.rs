//! Drives the configured task list through the orchestrator.
//!
//! Tasks are independent: the runner resets every agent before a task starts
//! so conversation state never leaks from one task into the next, and each
//! completed phase is appended to the task's log before the next phase runs.

use std::sync::Arc;

use crate::symposium::agent::Agent;
use crate::symposium::config::Task;
use crate::symposium::log_sink::LogSink;
use crate::symposium::orchestrator::{AgentOutput, Orchestrator, Phase};

/// Aggregate result of a run, mostly for operator logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunSummary {
    pub tasks_run: usize,
    pub agent_count: usize,
    pub total_tokens: usize,
}

pub struct TaskRunner {
    orchestrator: Orchestrator,
    sink: Arc<dyn LogSink>,
}

impl TaskRunner {
    pub fn new(orchestrator: Orchestrator, sink: Arc<dyn LogSink>) -> Self {
        TaskRunner { orchestrator, sink }
    }

    /// Execute every task in list order across `agents`.
    ///
    /// Zero agents or zero tasks is a valid no-op run (the permissive
    /// configuration default), reported at warn level rather than raised.
    pub async fn run_all(&self, agents: &mut [Agent], tasks: &[Task]) -> RunSummary {
        let mut summary = RunSummary {
            agent_count: agents.len(),
            ..RunSummary::default()
        };

        if agents.is_empty() || tasks.is_empty() {
            log::warn!(
                "symposium: nothing to do ({} agents, {} tasks)",
                agents.len(),
                tasks.len()
            );
            return summary;
        }

        for task in tasks {
            for agent in agents.iter_mut() {
                agent.reset();
            }

            log::info!("symposium: running task -> {}", task.file_name);
            let file_name = format!("log_{}", task.file_name);
            let sink = &self.sink;
            let transcript = self
                .orchestrator
                .run_task(agents, task, |phase, outputs| {
                    append_phase(sink.as_ref(), &file_name, phase, outputs);
                })
                .await;

            summary.total_tokens += transcript.total_tokens;
            summary.tasks_run += 1;

            if transcript.cancelled {
                log::warn!("symposium: run cancelled during task {}", task.file_name);
                break;
            }
        }

        summary
    }
}

fn append_phase(sink: &dyn LogSink, file_name: &str, phase: Phase, outputs: &[AgentOutput]) {
    for output in outputs {
        let section = format!(
            "{}\n{}\n\n",
            phase.section_label(output.agent_index),
            output.text
        );
        if let Err(err) = sink.append(file_name, &section) {
            log::error!("symposium: failed to append to {}: {}", file_name, err);
        }
    }
}
