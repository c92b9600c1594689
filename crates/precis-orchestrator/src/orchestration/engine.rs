// Orchestration engine for one streaming completion with mid-stream tool calls
//
// Idle -> Streaming -> {ToolPending -> Streaming}* -> Completed
//
// The model's events are consumed by a single sequential loop. The tool invoker
// is awaited inline, so the stream and the tool are never in flight together.

use futures::StreamExt;
use precis_abstraction::{
    ConversationMessage, StreamEvent, StreamRequest, StreamingModel, ToolCallPart, ToolResultPart,
};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{
    OrchestratorConfig, RunOutcome, RunPhase, STREAM_ERROR_LINE,
    state::{ResultDisposition, StreamState},
    summarize_failure_notice,
};
use crate::display::DisplayBuffer;
use crate::error::{RunError, ToolError};
use crate::summarize::Summarizer;
use crate::ui::{UiSection, UiStream};

/// Drives a model completion that may call the summarization tool.
pub struct SummarizeOrchestrator {
    /// Model endpoint
    model: Arc<dyn StreamingModel>,
    /// Tool invoker
    summarizer: Arc<dyn Summarizer>,
    config: OrchestratorConfig,
}

/// Output sinks of one run, bundled to keep handler signatures short.
struct Sinks<'a> {
    ui: &'a UiStream,
    display: &'a DisplayBuffer,
    cancel: &'a CancellationToken,
}

impl SummarizeOrchestrator {
    pub fn new(
        model: Arc<dyn StreamingModel>,
        summarizer: Arc<dyn Summarizer>,
        config: OrchestratorConfig,
    ) -> Self {
        Self { model, summarizer, config }
    }

    /// Runs one round of model interaction to completion.
    ///
    /// The assistant message (and a tool message when any results were
    /// recorded) is appended to `history` after the stream is drained.
    pub async fn run(
        &self,
        history: &mut Vec<ConversationMessage>,
        ui: &UiStream,
        display: &DisplayBuffer,
    ) -> RunOutcome {
        self.run_with_cancel(history, ui, display, &CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), stopping early once `cancel` fires.
    ///
    /// A cancelled run still appends whatever was accumulated to `history`.
    pub async fn run_with_cancel(
        &self,
        history: &mut Vec<ConversationMessage>,
        ui: &UiStream,
        display: &DisplayBuffer,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let sinks = Sinks { ui, display, cancel };
        let mut state = StreamState::new();

        let request = StreamRequest {
            system: self.config.system_prompt.clone(),
            messages: history.clone(),
            max_tokens: Some(self.config.max_tokens),
            tools: vec![self.config.tool_declaration()],
        };

        debug!(
            model_id = %self.model.model_id(),
            history_len = history.len(),
            specific_model = self.config.specific_model,
            "Starting orchestration run"
        );

        state.enter(RunPhase::Streaming);
        let cancelled = self.drain(request, &mut state, &sinks).await;

        state.enter(RunPhase::Completed);
        display.publish(state.text());

        history.push(ConversationMessage::assistant(state.text(), state.tool_calls().to_vec()));
        if !state.tool_results().is_empty() {
            history.push(ConversationMessage::tool(state.tool_results().to_vec()));
        }

        let outcome = state.into_outcome(cancelled);
        info!(
            has_error = outcome.has_error,
            cancelled = outcome.cancelled,
            tool_calls = outcome.tool_calls.len(),
            text_len = outcome.text.len(),
            "Orchestration run completed"
        );
        outcome
    }

    /// Consumes the event stream. Returns `true` when stopped by cancellation.
    async fn drain(&self, request: StreamRequest, state: &mut StreamState, sinks: &Sinks<'_>) -> bool {
        let opened = tokio::select! {
            biased;
            () = sinks.cancel.cancelled() => return true,
            opened = self.model.stream(request) => opened,
        };

        let mut events = match opened {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "Model request failed");
                state.fail(STREAM_ERROR_LINE, RunError::Stream { message: e.to_string() });
                sinks.display.publish(state.text());
                return false;
            }
        };

        loop {
            let event = tokio::select! {
                biased;
                () = sinks.cancel.cancelled() => return true,
                event = events.next() => event,
            };
            let Some(event) = event else {
                return false;
            };

            match event {
                StreamEvent::TextDelta(delta) => {
                    if state.push_text(&delta) {
                        sinks.ui.materialize_answer();
                    }
                    sinks.display.publish(state.text());
                }
                StreamEvent::ToolCall(call) => {
                    if self.handle_tool_call(call, state, sinks).await {
                        return true;
                    }
                }
                StreamEvent::ToolResult(result) => {
                    if state.record_result(result) == ResultDisposition::Recorded {
                        debug!("Recorded inline tool result");
                    }
                }
                StreamEvent::Error(message) => {
                    warn!(error = %message, "Model stream reported an error");
                    state.fail(STREAM_ERROR_LINE, RunError::Stream { message });
                    sinks.display.publish(state.text());
                }
            }
        }
    }

    /// Announces, invokes and records one tool call. Returns `true` when cancelled.
    async fn handle_tool_call(
        &self,
        call: ToolCallPart,
        state: &mut StreamState,
        sinks: &Sinks<'_>,
    ) -> bool {
        debug!(tool_call_id = %call.tool_call_id, tool = %call.tool_name, "Tool call received");
        // Ids stay unique within a run; a repeat is never invoked
        if state.has_call(&call.tool_call_id) {
            warn!(tool_call_id = %call.tool_call_id, tool = %call.tool_name, "Dropping tool call with a repeated id");
            return false;
        }
        state.record_call(call.clone());

        if call.tool_name != self.config.tool_name {
            warn!(tool = %call.tool_name, "Model called an undeclared tool");
            let error = ToolError::UnknownTool(call.tool_name.clone());
            state.record_result(ToolResultPart::error(&call, error.to_string()));
            state.fail(
                STREAM_ERROR_LINE,
                RunError::ToolInvocation { tool_call_id: call.tool_call_id.clone(), error },
            );
            sinks.display.publish(state.text());
            return false;
        }

        state.enter(RunPhase::ToolPending);

        let url = call.args.get("url").and_then(Value::as_str).map(str::to_string);
        // Shown in the badge and in failure notices
        let target = url.clone().unwrap_or_else(|| call.args.to_string());

        sinks.ui.append(UiSection::ToolBadge {
            tool: self.config.tool_label.clone(),
            argument: target.clone(),
        });
        sinks.ui.append(UiSection::Loading);

        let result = match url {
            Some(url) => {
                tokio::select! {
                    biased;
                    () = sinks.cancel.cancelled() => Err(ToolError::Cancelled),
                    result = self.summarizer.summarize(&url) => result,
                }
            }
            None => Err(ToolError::InvalidArguments {
                tool: call.tool_name.clone(),
                reason: "missing string argument `url`".to_string(),
            }),
        };

        let cancelled = match result {
            Ok(data) => {
                state.record_result(ToolResultPart::success(&call, data));
                if !self.config.specific_model {
                    sinks.ui.materialize_answer();
                }
                false
            }
            Err(ToolError::Cancelled) => {
                debug!(url = %target, "Summarize cancelled");
                state.record_result(ToolResultPart::error(&call, ToolError::Cancelled.to_string()));
                sinks.ui.update(UiSection::ErrorNotice(ToolError::Cancelled.to_string()));
                true
            }
            Err(error) => {
                warn!(url = %target, error = %error, "Summarize failed");
                let notice = summarize_failure_notice(&target);
                state.record_result(ToolResultPart::error(&call, error.to_string()));
                state.fail(
                    &format!("\n{notice}"),
                    RunError::ToolInvocation { tool_call_id: call.tool_call_id.clone(), error },
                );
                sinks.ui.update(UiSection::ErrorNotice(notice));
                sinks.display.publish(state.text());
                false
            }
        };

        state.enter(RunPhase::Streaming);
        cancelled
    }
}
