use std::env;
use std::process;
use std::sync::Arc;

use symposium::{AgentRegistry, FileLogSink, Orchestrator, SymposiumConfig, TaskRunner};

#[tokio::main]
async fn main() {
    symposium::init_logger();

    let config_path = env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = SymposiumConfig::load(&config_path);

    let mut agents = match AgentRegistry::create_all(&config.agents) {
        Ok(agents) => agents,
        Err(err) => {
            eprintln!("symposium: {}", err);
            process::exit(1);
        }
    };

    let orchestrator = Orchestrator::new(config.instructions.clone());
    let runner = TaskRunner::new(orchestrator, Arc::new(FileLogSink::default()));
    let summary = runner.run_all(&mut agents, &config.tasks).await;

    log::info!(
        "symposium: finished {} task(s) across {} agent(s), {} tokens spent",
        summary.tasks_run,
        summary.agent_count,
        summary.total_tokens
    );
}
