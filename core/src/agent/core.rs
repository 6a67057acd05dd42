//! AgentCore implementation

use super::config::AgentConfig;
use super::execution::{AgentRequest, AgentResponse, OutputItem};
use super::prompt::system_prompt;
use crate::error::{AgentError, Result};
use crate::llm::{LlmClient, LlmMessage, LlmResponse, StreamAccumulator, ToolDefinition};
use crate::output::{
    AgentEvent, AgentOutput, ExecutionContext, NullOutput, TokenUsage, ToolExecutionInfo,
    ToolExecutionStatus,
};
use crate::retry::RetryPolicy;
use crate::search::SearchBackend;
use crate::tools::{ToolCall, ToolExecutor, ToolRegistry};
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Text emitted when the iteration budget runs out before a final answer
pub const MAX_ITERATIONS_MESSAGE: &str =
    "Max iterations reached. Please try a more specific question.";

/// Text emitted when a request fails outside tool execution
pub const FALLBACK_MESSAGE: &str =
    "I'm having trouble processing your request right now. Please try again or rephrase your question.";

/// The account intelligence agent.
///
/// Holds no per-request state, so one instance can serve concurrent
/// requests; each request owns its message history.
pub struct AgentCore {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    tool_executor: ToolExecutor,
    retry: RetryPolicy,
}

/// Per-request bookkeeping: the sink, completed items and token totals
struct Turn<'a> {
    output: &'a dyn AgentOutput,
    items: Vec<OutputItem>,
    usage: TokenUsage,
    iterations: usize,
}

impl<'a> Turn<'a> {
    fn new(output: &'a dyn AgentOutput) -> Self {
        Self {
            output,
            items: Vec::new(),
            usage: TokenUsage::default(),
            iterations: 0,
        }
    }

    async fn event(&self, event: AgentEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            debug!(error = %e, "failed to emit agent event");
        }
    }

    async fn item(&mut self, item: OutputItem) {
        self.items.push(item.clone());
        self.event(AgentEvent::OutputItemDone { item }).await;
    }
}

impl AgentCore {
    /// Create an agent with every search tool bound to `search`
    pub fn new(
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        search: Arc<dyn SearchBackend>,
    ) -> Self {
        let tool_executor = ToolRegistry::with_search_backend(search).create_executor_with_all();
        Self {
            retry: RetryPolicy::new(config.retry.clone()),
            config,
            llm_client,
            tool_executor,
        }
    }

    /// Replace the tool set
    pub fn with_tool_executor(mut self, tool_executor: ToolExecutor) -> Self {
        self.tool_executor = tool_executor;
        self
    }

    /// Replace the retry policy used for LLM calls
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Names of the tools offered to the model
    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_executor.list_tools()
    }

    /// Answer a request and return every completed output item
    pub async fn predict(&self, request: &AgentRequest) -> AgentResponse {
        self.predict_stream(request, &NullOutput).await
    }

    /// Answer a request, reporting progress to `output` as it happens.
    ///
    /// Never fails: errors escaping the loop are logged and replaced by a
    /// single fallback text item.
    pub async fn predict_stream(
        &self,
        request: &AgentRequest,
        output: &dyn AgentOutput,
    ) -> AgentResponse {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "agent_request",
            request_id = %request_id,
            user_id = request.user_id().unwrap_or("-"),
            conversation_id = request.conversation_id().unwrap_or("-"),
        );

        let mut turn = Turn::new(output);
        let mut context = ExecutionContext {
            request_id,
            user_id: request.user_id().map(str::to_string),
            conversation_id: request.conversation_id().map(str::to_string),
            max_iterations: self.config.max_iterations,
            iterations: 0,
            execution_time: std::time::Duration::ZERO,
            token_usage: TokenUsage::default(),
        };
        turn.event(AgentEvent::ExecutionStarted {
            context: context.clone(),
        })
        .await;

        let start = Instant::now();
        let outcome = self.run(request, &mut turn).instrument(span.clone()).await;

        let success = match outcome {
            Ok(()) => true,
            Err(e) => {
                span.in_scope(|| error!(error = %e, "request failed"));
                turn.item(OutputItem::new_text(FALLBACK_MESSAGE)).await;
                false
            }
        };

        context.iterations = turn.iterations;
        context.execution_time = start.elapsed();
        context.token_usage = turn.usage;
        turn.event(AgentEvent::ExecutionCompleted { context, success })
            .await;
        if let Err(e) = output.flush().await {
            debug!(error = %e, "failed to flush output");
        }

        AgentResponse { output: turn.items }
    }

    async fn run(&self, request: &AgentRequest, turn: &mut Turn<'_>) -> Result<()> {
        if request.input.is_empty() {
            return Err(AgentError::InvalidRequest {
                message: "request has no input messages".to_string(),
            }
            .into());
        }

        let mut messages = Vec::with_capacity(request.input.len() + 1);
        messages.push(LlmMessage::system(system_prompt(
            self.config.system_prompt.as_deref(),
        )));
        messages.extend(request.input.iter().map(LlmMessage::from));

        info!(
            messages = request.input.len(),
            max_iterations = self.config.max_iterations,
            "processing request"
        );

        let tools = self.tool_executor.get_tool_definitions();
        let mut pending: VecDeque<ToolCall> = VecDeque::new();

        for iteration in 1..=self.config.max_iterations {
            if pending.is_empty() && last_is_final_answer(&messages) {
                return Ok(());
            }
            turn.iterations = iteration;

            if let Some(call) = pending.pop_front() {
                self.run_tool(call, &mut messages, turn).await;
                continue;
            }

            let (response, item_id) = self.call_llm(&messages, &tools, turn).await?;
            if let Some(usage) = &response.usage {
                turn.usage.accumulate(usage);
                turn.output.emit_token_update(turn.usage).await.ok();
            }

            let message = response.message;
            let calls = message.tool_calls();
            if let Some(text) = message.get_text().filter(|t| !t.trim().is_empty()) {
                turn.item(OutputItem::text(item_id, text)).await;
            }
            for call in &calls {
                turn.item(OutputItem::function_call(&call.id, &call.name, &call.parameters))
                    .await;
            }

            debug!(iteration, tool_calls = calls.len(), "model responded");
            messages.push(message);
            pending.extend(calls);
        }

        if pending.is_empty() && last_is_final_answer(&messages) {
            return Ok(());
        }

        warn!(
            max_iterations = self.config.max_iterations,
            pending_tool_calls = pending.len(),
            "iteration budget exhausted"
        );
        turn.item(OutputItem::new_text(MAX_ITERATIONS_MESSAGE)).await;
        Ok(())
    }

    /// Call the model once, streaming when possible.
    ///
    /// Returns the response and the id used for its text deltas. Opening the
    /// request and reading its first chunk are retried; a stream that fails
    /// after that is an error.
    async fn call_llm(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolDefinition],
        turn: &Turn<'_>,
    ) -> Result<(LlmResponse, String)> {
        let item_id = Uuid::new_v4().to_string();
        let tools = if tools.is_empty() {
            None
        } else {
            Some(tools.to_vec())
        };

        if !(self.config.stream && self.llm_client.supports_streaming()) {
            let response = self
                .retry
                .execute(|| {
                    self.llm_client
                        .chat_completion(messages.to_vec(), tools.clone(), None)
                })
                .await?;
            return Ok((response, item_id));
        }

        // The endpoint reports HTTP errors as the first stream item, so an
        // attempt only succeeds once that item has arrived.
        let (first, mut stream) = self
            .retry
            .execute(|| async {
                let mut stream = self
                    .llm_client
                    .chat_completion_stream(messages.to_vec(), tools.clone(), None)
                    .await?;
                let first = stream.next().await.transpose()?;
                Ok::<_, crate::error::Error>((first, stream))
            })
            .await?;

        let mut accumulator = StreamAccumulator::new();
        let mut next = first;
        while let Some(chunk) = next {
            if let Some(delta) = accumulator.push(chunk) {
                turn.event(AgentEvent::TextDelta {
                    item_id: item_id.clone(),
                    delta,
                })
                .await;
            }
            next = stream.next().await.transpose()?;
        }

        Ok((accumulator.finish(self.llm_client.model_name()), item_id))
    }

    async fn run_tool(&self, call: ToolCall, messages: &mut Vec<LlmMessage>, turn: &mut Turn<'_>) {
        turn.event(AgentEvent::ToolExecutionStarted {
            tool_info: ToolExecutionInfo::new(&call, ToolExecutionStatus::Executing, None),
        })
        .await;

        let result = self.tool_executor.execute(call.clone()).await;
        let status = if result.success {
            ToolExecutionStatus::Success
        } else {
            ToolExecutionStatus::Error
        };
        info!(
            tool = %call.name,
            success = result.success,
            duration_ms = result.duration_ms.unwrap_or_default(),
            "tool finished"
        );

        turn.event(AgentEvent::ToolExecutionCompleted {
            tool_info: ToolExecutionInfo::new(&call, status, Some(&result)),
        })
        .await;

        messages.push(LlmMessage::tool_result(
            call.id.clone(),
            result.content.clone(),
            !result.success,
        ));
        turn.item(OutputItem::function_call_output(&call.id, result.content))
            .await;
    }
}

fn last_is_final_answer(messages: &[LlmMessage]) -> bool {
    messages.last().is_some_and(LlmMessage::is_final_answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::InputMessage;
    use crate::error::{LlmError, SearchError};
    use crate::llm::{ChatOptions, LlmStream, LlmStreamChunk, ToolCallDelta};
    use crate::output::OutputResult;
    use crate::retry::RetryConfig;
    use crate::search::{SearchHit, SearchRequest};
    use crate::tools::{TOOL_FAILURE_MESSAGE, UNKNOWN_TOOL_MESSAGE};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned responses and records the messages it was sent
    #[derive(Default)]
    struct ScriptedLlm {
        responses: Mutex<VecDeque<Result<LlmResponse>>>,
        streams: Mutex<VecDeque<Vec<Result<LlmStreamChunk>>>>,
        seen: Mutex<Vec<Vec<LlmMessage>>>,
        streaming: bool,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<LlmResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn streaming(streams: Vec<Vec<LlmStreamChunk>>) -> Self {
            Self::streaming_results(
                streams
                    .into_iter()
                    .map(|chunks| chunks.into_iter().map(Ok).collect())
                    .collect(),
            )
        }

        fn streaming_results(streams: Vec<Vec<Result<LlmStreamChunk>>>) -> Self {
            Self {
                streams: Mutex::new(streams.into()),
                streaming: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            self.seen.lock().unwrap().push(messages);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(answer("script exhausted")))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn provider_name(&self) -> &str {
            "test"
        }

        fn supports_streaming(&self) -> bool {
            self.streaming
        }

        async fn chat_completion_stream(
            &self,
            messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmStream<'_>> {
            self.seen.lock().unwrap().push(messages);
            let chunks = self.streams.lock().unwrap().pop_front().unwrap_or_default();
            Ok(futures::stream::iter(chunks).boxed())
        }
    }

    struct FixedSearch;

    #[async_trait]
    impl SearchBackend for FixedSearch {
        async fn search(
            &self,
            request: &SearchRequest,
        ) -> std::result::Result<Vec<SearchHit>, SearchError> {
            Ok(vec![SearchHit {
                title: format!("Result for {}", request.query),
                url: "https://docs.example/1".to_string(),
                content: "Renewal date: 2026-06-30".to_string(),
                datasource: "salescloud".to_string(),
                author: "Unknown".to_string(),
                updated_at: String::new(),
            }])
        }
    }

    #[derive(Default)]
    struct RecordingOutput {
        events: Mutex<Vec<AgentEvent>>,
    }

    #[async_trait]
    impl AgentOutput for RecordingOutput {
        async fn emit_event(&self, event: AgentEvent) -> OutputResult {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn answer(text: &str) -> LlmResponse {
        LlmResponse {
            message: LlmMessage::assistant(text),
            usage: None,
            model: "scripted".to_string(),
            finish_reason: None,
        }
    }

    fn tool_calls(calls: Vec<(&str, &str, serde_json::Value)>) -> LlmResponse {
        let calls = calls
            .into_iter()
            .map(|(id, name, parameters)| ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                parameters,
            })
            .collect();
        LlmResponse {
            message: LlmMessage::assistant_with_tool_calls(None, calls),
            usage: None,
            model: "scripted".to_string(),
            finish_reason: None,
        }
    }

    fn agent(llm: Arc<ScriptedLlm>, max_iterations: usize) -> AgentCore {
        let config = AgentConfig {
            max_iterations,
            ..Default::default()
        };
        AgentCore::new(config, llm, Arc::new(FixedSearch)).with_retry_policy(RetryPolicy::new(
            RetryConfig {
                max_retries: 2,
                base_delay_ms: 1,
                max_delay_ms: 1,
                multiplier: 1.0,
                jitter: 0.0,
            },
        ))
    }

    fn question(text: &str) -> AgentRequest {
        AgentRequest::from_question(text)
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(answer("Hello there."))]));
        let response = agent(llm.clone(), 10).predict(&question("hi")).await;

        assert_eq!(response.output.len(), 1);
        assert_eq!(response.final_text(), Some("Hello there."));
        assert_eq!(llm.calls(), 1);

        let first_call = &llm.seen.lock().unwrap()[0];
        assert_eq!(first_call.len(), 2);
        assert!(first_call[0]
            .get_text()
            .unwrap()
            .starts_with("# EPS Account Intelligence Agent"));
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(tool_calls(vec![(
                "call_1",
                "search_salesforce_opportunities",
                json!({"query": "Tesla renewal"}),
            )])),
            Ok(answer("Tesla renews **Jun 30, 2026**.")),
        ]));
        let response = agent(llm.clone(), 10)
            .predict(&question("When does Tesla renew?"))
            .await;

        assert_eq!(response.output.len(), 3);
        assert!(matches!(
            &response.output[0],
            OutputItem::FunctionCall { call_id, name, arguments, .. }
                if call_id == "call_1"
                    && name == "search_salesforce_opportunities"
                    && arguments == r#"{"query":"Tesla renewal"}"#
        ));
        match &response.output[1] {
            OutputItem::FunctionCallOutput { call_id, output } => {
                assert_eq!(call_id, "call_1");
                assert!(output.starts_with("Found 1 result(s) from Salesforce Opportunities"));
                assert!(output.contains("\"Tesla\" renewal"));
            }
            other => panic!("unexpected item {:?}", other),
        }
        assert_eq!(response.final_text(), Some("Tesla renews **Jun 30, 2026**."));

        // The second LLM call sees the tool result
        let second_call = &llm.seen.lock().unwrap()[1];
        assert_eq!(second_call.last().unwrap().role, crate::llm::MessageRole::Tool);
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_arguments() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(tool_calls(vec![
                ("a", "search_the_web", json!({"query": "x"})),
                ("b", "search_strategy_docs", json!("{not json")),
            ])),
            Ok(answer("Sorry.")),
        ]));
        let response = agent(llm.clone(), 10).predict(&question("q")).await;

        let outputs: Vec<&str> = response
            .output
            .iter()
            .filter_map(|item| match item {
                OutputItem::FunctionCallOutput { output, .. } => Some(output.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(outputs, vec![UNKNOWN_TOOL_MESSAGE, TOOL_FAILURE_MESSAGE]);
        assert_eq!(response.final_text(), Some("Sorry."));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_one_tool_per_iteration_and_budget() {
        // 1: LLM, 2: tool a, 3: tool b -> budget spent with no final answer
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(tool_calls(vec![
            ("a", "search_salesforce_accounts", json!({"query": "Ford"})),
            ("b", "search_salesforce_contacts", json!({"query": "Ford contacts"})),
            ("c", "search_communications", json!({"query": "Ford calls"})),
        ]))]));
        let response = agent(llm.clone(), 3).predict(&question("Ford?")).await;

        let tool_outputs = response
            .output
            .iter()
            .filter(|i| matches!(i, OutputItem::FunctionCallOutput { .. }))
            .count();
        assert_eq!(tool_outputs, 2);
        assert_eq!(llm.calls(), 1);
        assert_eq!(response.final_text(), Some(MAX_ITERATIONS_MESSAGE));
    }

    #[tokio::test]
    async fn test_model_that_never_stops_hits_the_budget() {
        let looping: Vec<Result<LlmResponse>> = (0..20)
            .map(|i| {
                Ok(tool_calls(vec![(
                    &*format!("call_{}", i),
                    "search_general_fallback",
                    json!({"query": "anything"}),
                )]))
            })
            .collect();
        let llm = Arc::new(ScriptedLlm::new(looping));
        let response = agent(llm.clone(), 10).predict(&question("loop")).await;

        assert_eq!(llm.calls(), 5);
        assert_eq!(response.final_text(), Some(MAX_ITERATIONS_MESSAGE));
    }

    #[tokio::test]
    async fn test_answer_in_last_iteration_is_not_truncated() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(tool_calls(vec![(
                "a",
                "search_salesforce_accounts",
                json!({"query": "Hilton"}),
            )])),
            Ok(answer("Hilton is a hospitality account.")),
        ]));
        let response = agent(llm, 3).predict(&question("Hilton?")).await;
        assert_eq!(response.final_text(), Some("Hilton is a hospitality account."));
    }

    #[tokio::test]
    async fn test_llm_failure_yields_fallback() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(LlmError::Authentication {
            message: "bad token".to_string(),
        }
        .into())]));
        let response = agent(llm.clone(), 10).predict(&question("hi")).await;
        assert_eq!(response.output.len(), 1);
        assert_eq!(response.final_text(), Some(FALLBACK_MESSAGE));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Err(LlmError::RateLimit {
                message: "slow down".to_string(),
            }
            .into()),
            Ok(answer("Done.")),
        ]));
        let response = agent(llm.clone(), 10).predict(&question("hi")).await;
        assert_eq!(response.final_text(), Some("Done."));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_in_first_stream_chunk_is_retried() {
        let llm = Arc::new(ScriptedLlm::streaming_results(vec![
            vec![Err(LlmError::RateLimit {
                message: "Invalid status code: 429".to_string(),
            }
            .into())],
            vec![Ok(LlmStreamChunk {
                delta: Some("Done.".to_string()),
                ..Default::default()
            })],
        ]));
        let response = agent(llm.clone(), 10).predict(&question("hi")).await;
        assert_eq!(response.final_text(), Some("Done."));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_stream_failure_after_first_chunk_is_not_retried() {
        let llm = Arc::new(ScriptedLlm::streaming_results(vec![
            vec![
                Ok(LlmStreamChunk {
                    delta: Some("Partial".to_string()),
                    ..Default::default()
                }),
                Err(LlmError::RateLimit {
                    message: "slow down".to_string(),
                }
                .into()),
            ],
            vec![Ok(LlmStreamChunk {
                delta: Some("Never read.".to_string()),
                ..Default::default()
            })],
        ]));
        let response = agent(llm.clone(), 10).predict(&question("hi")).await;
        assert_eq!(response.final_text(), Some(FALLBACK_MESSAGE));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_input_ending_with_answer_yields_no_items() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(answer("unused"))]));
        let request = AgentRequest {
            input: vec![
                InputMessage::user("When does Tesla renew?"),
                InputMessage::assistant("June 2026."),
            ],
            context: None,
        };
        let response = agent(llm.clone(), 10).predict(&request).await;
        assert!(response.output.is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_request_yields_fallback() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let response = agent(llm.clone(), 10).predict(&AgentRequest::default()).await;
        assert_eq!(response.final_text(), Some(FALLBACK_MESSAGE));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_conversation_history_is_forwarded() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(answer("Still June."))]));
        let request = AgentRequest {
            input: vec![
                InputMessage::user("When does Tesla renew?"),
                InputMessage::assistant("June 2026."),
                InputMessage::user("Are you sure?"),
            ],
            context: None,
        };
        agent(llm.clone(), 10).predict(&request).await;
        assert_eq!(llm.seen.lock().unwrap()[0].len(), 4);
    }

    #[tokio::test]
    async fn test_streaming_emits_deltas_and_assembles_tool_calls() {
        let llm = Arc::new(ScriptedLlm::streaming(vec![
            vec![
                LlmStreamChunk {
                    tool_calls: vec![ToolCallDelta {
                        index: 0,
                        id: Some("call_9".to_string()),
                        name: Some("search_strategy_docs".to_string()),
                        arguments: Some("{\"query\":".to_string()),
                    }],
                    ..Default::default()
                },
                LlmStreamChunk {
                    tool_calls: vec![ToolCallDelta {
                        index: 0,
                        arguments: Some("\"BBW QBR\"}".to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
            vec![
                LlmStreamChunk {
                    delta: Some("The last ".to_string()),
                    ..Default::default()
                },
                LlmStreamChunk {
                    delta: Some("QBR was in May.".to_string()),
                    ..Default::default()
                },
            ],
        ]));
        let output = RecordingOutput::default();
        let response = agent(llm, 10)
            .predict_stream(&question("BBW QBR?"), &output)
            .await;

        assert_eq!(response.final_text(), Some("The last QBR was in May."));
        match &response.output[1] {
            OutputItem::FunctionCallOutput { call_id, output } => {
                assert_eq!(call_id, "call_9");
                assert!(output.contains("Bath & Body Works"));
            }
            other => panic!("unexpected item {:?}", other),
        }

        let events = output.events.lock().unwrap();
        let deltas: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                AgentEvent::TextDelta { delta, .. } => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, vec!["The last ", "QBR was in May."]);
        assert!(matches!(events.first(), Some(AgentEvent::ExecutionStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(AgentEvent::ExecutionCompleted { success: true, .. })
        ));
    }
}
