use async_trait::async_trait;
use std::collections::VecDeque;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use symposium::{
    Agent, AgentDescriptor, ClientWrapper, ErrorPolicy, Message, Orchestrator, PhaseExecution,
    ProviderFamily, Role, Task, CRITIQUE_PREAMBLE, REFINE_PREAMBLE,
};

/// Mock backend with scripted replies; records the user prompt of every call.
struct ScriptedClient {
    name: String,
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(name: &str, responses: Vec<Result<String, String>>) -> Self {
        ScriptedClient {
            name: name.to_string(),
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl ClientWrapper for ScriptedClient {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn send_message(
        &self,
        messages: &[Message],
    ) -> Result<Message, Box<dyn Error + Send + Sync>> {
        let prompt = messages
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();
        self.prompts.lock().await.push(prompt);

        let next = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()));
        match next {
            Ok(text) => Ok(Message {
                role: Role::Assistant,
                content: text,
            }),
            Err(message) => Err(message.into()),
        }
    }
}

fn descriptor(model: &str) -> AgentDescriptor {
    AgentDescriptor {
        family: ProviderFamily::from_model_id(model),
        model_id: model.to_string(),
        temperature: 1.0,
        instructions: "You are a helpful assistant.".to_string(),
    }
}

fn agent_with(client: Arc<ScriptedClient>) -> Agent {
    Agent::new(descriptor("gpt-4o"), client)
}

fn task() -> Task {
    Task {
        request: "What is 2+2?".to_string(),
        file_name: "t.log".to_string(),
    }
}

#[tokio::test]
async fn every_phase_yields_one_output_per_agent_in_index_order() {
    let a = Arc::new(ScriptedClient::new(
        "mock-a",
        vec![Ok("a1".to_string()), Ok("a2".to_string()), Ok("a3".to_string())],
    ));
    let b = Arc::new(ScriptedClient::new(
        "mock-b",
        vec![Ok("b1".to_string()), Ok("b2".to_string()), Ok("b3".to_string())],
    ));
    let mut agents = vec![agent_with(a.clone()), agent_with(b.clone())];

    let orchestrator = Orchestrator::new("Be brief");
    let transcript = orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    for phase in [&transcript.initial, &transcript.critiques, &transcript.refined].iter() {
        assert_eq!(phase.len(), 2);
        assert_eq!(phase[0].agent_index, 0);
        assert_eq!(phase[1].agent_index, 1);
    }
    assert_eq!(transcript.initial[0].text, "a1");
    assert_eq!(transcript.critiques[1].text, "b2");
    assert_eq!(transcript.refined[1].text, "b3");
}

#[tokio::test]
async fn initial_prompt_is_request_plus_global_instructions() {
    let a = Arc::new(ScriptedClient::new("mock-a", vec![]));
    let mut agents = vec![agent_with(a.clone())];

    let orchestrator = Orchestrator::new("Be brief");
    orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    let prompts = a.recorded_prompts().await;
    assert_eq!(prompts[0], "What is 2+2?\n\nBe brief");
}

#[tokio::test]
async fn critique_and_refine_prompts_exclude_own_outputs() {
    let a = Arc::new(ScriptedClient::new(
        "mock-a",
        vec![
            Ok("resp-0".to_string()),
            Ok("crit-0".to_string()),
            Ok("ref-0".to_string()),
        ],
    ));
    let b = Arc::new(ScriptedClient::new(
        "mock-b",
        vec![
            Ok("resp-1".to_string()),
            Ok("crit-1".to_string()),
            Ok("ref-1".to_string()),
        ],
    ));
    let mut agents = vec![agent_with(a.clone()), agent_with(b.clone())];

    let orchestrator = Orchestrator::new("Be brief");
    orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    let prompts_a = a.recorded_prompts().await;
    assert_eq!(prompts_a.len(), 3);
    assert!(prompts_a[1].contains("resp-1"));
    assert!(!prompts_a[1].contains("resp-0"));
    assert!(prompts_a[2].contains("crit-1"));
    assert!(!prompts_a[2].contains("crit-0"));

    let prompts_b = b.recorded_prompts().await;
    assert!(prompts_b[1].contains("resp-0"));
    assert!(!prompts_b[1].contains("resp-1"));
}

#[tokio::test]
async fn single_agent_round_degenerates_to_bare_preambles() {
    let a = Arc::new(ScriptedClient::new(
        "solo",
        vec![
            Ok("only answer".to_string()),
            Ok("nothing to critique".to_string()),
            Ok("final answer".to_string()),
        ],
    ));
    let mut agents = vec![agent_with(a.clone())];

    let orchestrator = Orchestrator::new("Be brief");
    let transcript = orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    assert_eq!(transcript.initial.len(), 1);
    assert_eq!(transcript.refined.len(), 1);
    assert_eq!(transcript.refined[0].text, "final answer");

    let prompts = a.recorded_prompts().await;
    assert_eq!(prompts[1], CRITIQUE_PREAMBLE);
    assert_eq!(prompts[2], REFINE_PREAMBLE);
}

#[tokio::test]
async fn backend_failure_becomes_error_text_seen_by_the_others() {
    let a = Arc::new(ScriptedClient::new(
        "failing",
        vec![
            Err("connection refused".to_string()),
            Ok("crit-0".to_string()),
            Ok("ref-0".to_string()),
        ],
    ));
    let b = Arc::new(ScriptedClient::new(
        "healthy",
        vec![
            Ok("resp-1".to_string()),
            Ok("crit-1".to_string()),
            Ok("ref-1".to_string()),
        ],
    ));
    let mut agents = vec![agent_with(a), agent_with(b.clone())];

    let orchestrator = Orchestrator::new("Be brief");
    let transcript = orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    assert!(transcript.initial[0].errored);
    assert_eq!(transcript.initial[0].text, "Error: connection refused");
    // The round continued for everybody.
    assert_eq!(transcript.refined.len(), 2);

    let prompts_b = b.recorded_prompts().await;
    assert!(prompts_b[1].contains("Error: connection refused"));
}

#[tokio::test]
async fn exclude_policy_keeps_error_text_out_of_prompts() {
    let a = Arc::new(ScriptedClient::new(
        "failing",
        vec![Err("connection refused".to_string())],
    ));
    let b = Arc::new(ScriptedClient::new(
        "healthy",
        vec![
            Ok("resp-1".to_string()),
            Ok("crit-1".to_string()),
            Ok("ref-1".to_string()),
        ],
    ));
    let mut agents = vec![agent_with(a), agent_with(b.clone())];

    let orchestrator =
        Orchestrator::new("Be brief").with_error_policy(ErrorPolicy::ExcludeFromPrompts);
    let transcript = orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    // The phase record still carries all outputs, errored ones included.
    assert_eq!(transcript.initial.len(), 2);
    assert!(transcript.initial[0].errored);

    let prompts_b = b.recorded_prompts().await;
    assert_eq!(prompts_b[1], CRITIQUE_PREAMBLE);
}

#[tokio::test]
async fn parallel_execution_preserves_index_alignment() {
    let clients: Vec<Arc<ScriptedClient>> = (0..3)
        .map(|i| {
            Arc::new(ScriptedClient::new(
                "mock",
                vec![
                    Ok(format!("initial-{}", i)),
                    Ok(format!("critique-{}", i)),
                    Ok(format!("refined-{}", i)),
                ],
            ))
        })
        .collect();
    let mut agents: Vec<Agent> = clients.iter().map(|c| agent_with(c.clone())).collect();

    let orchestrator = Orchestrator::new("Be brief").with_execution(PhaseExecution::Parallel);
    let transcript = orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    for i in 0..3 {
        assert_eq!(transcript.initial[i].agent_index, i);
        assert_eq!(transcript.initial[i].text, format!("initial-{}", i));
        assert_eq!(transcript.refined[i].text, format!("refined-{}", i));
    }
}

/// Mock backend that never answers in time.
struct SlowClient;

#[async_trait]
impl ClientWrapper for SlowClient {
    fn model_name(&self) -> &str {
        "slow-mock"
    }

    async fn send_message(
        &self,
        _messages: &[Message],
    ) -> Result<Message, Box<dyn Error + Send + Sync>> {
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        Ok(Message {
            role: Role::Assistant,
            content: "too late".to_string(),
        })
    }
}

#[tokio::test]
async fn timed_out_call_is_an_agent_level_error() {
    let slow = Agent::new(descriptor("gpt-4o"), Arc::new(SlowClient))
        .with_call_timeout(std::time::Duration::from_millis(50));
    let healthy = agent_with(Arc::new(ScriptedClient::new(
        "healthy",
        vec![
            Ok("resp-1".to_string()),
            Ok("crit-1".to_string()),
            Ok("ref-1".to_string()),
        ],
    )));
    let mut agents = vec![slow, healthy];

    let orchestrator = Orchestrator::new("Be brief");
    let transcript = orchestrator.run_task(&mut agents, &task(), |_, _| {}).await;

    assert!(transcript.initial[0].errored);
    assert!(transcript.initial[0].text.starts_with("Error: call timed out"));
    // The other agent still completed every phase.
    assert!(!transcript.initial[1].errored);
    assert_eq!(transcript.refined.len(), 2);
}

#[tokio::test]
async fn cancelled_token_stops_the_task_at_the_phase_boundary() {
    let a = Arc::new(ScriptedClient::new("mock-a", vec![]));
    let mut agents = vec![agent_with(a)];

    let token = CancellationToken::new();
    token.cancel();
    let orchestrator = Orchestrator::new("Be brief").with_cancellation(token);

    let mut phases_seen = 0;
    let transcript = orchestrator
        .run_task(&mut agents, &task(), |_, _| {
            phases_seen += 1;
        })
        .await;

    assert!(transcript.cancelled);
    assert!(transcript.initial.is_empty());
    assert_eq!(phases_seen, 0);
}
