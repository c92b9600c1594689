// Per-run accumulation state
//
// Owned by exactly one run. Mutated per event and consumed into a `RunOutcome`
// once the stream ends.

use precis_abstraction::{ToolCallPart, ToolResultPart};
use tracing::{debug, warn};

use super::{RunOutcome, RunPhase};
use crate::error::RunError;

/// What happened to a tool result offered to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResultDisposition {
    Recorded,
    /// No recorded call carries this id
    Unmatched,
    /// The call already has a result
    Duplicate,
}

#[derive(Debug)]
pub(crate) struct StreamState {
    text: String,
    has_error: bool,
    first_text_seen: bool,
    tool_calls: Vec<ToolCallPart>,
    tool_results: Vec<ToolResultPart>,
    errors: Vec<RunError>,
    phases: Vec<RunPhase>,
}

impl StreamState {
    pub(crate) fn new() -> Self {
        Self {
            text: String::new(),
            has_error: false,
            first_text_seen: false,
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            errors: Vec::new(),
            phases: vec![RunPhase::Idle],
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn phase(&self) -> RunPhase {
        self.phases.last().copied().unwrap_or(RunPhase::Idle)
    }

    /// Records a transition. Repeating the current phase is a no-op.
    pub(crate) fn enter(&mut self, phase: RunPhase) {
        if self.phase() != phase {
            debug!(from = %self.phase(), to = %phase, "Run phase transition");
            self.phases.push(phase);
        }
    }

    /// Appends a text delta. Returns `true` for the first non-empty delta of the run.
    pub(crate) fn push_text(&mut self, delta: &str) -> bool {
        if delta.is_empty() {
            return false;
        }
        self.text.push_str(delta);
        !std::mem::replace(&mut self.first_text_seen, true)
    }

    /// Sets the error flag and appends a diagnostic line to the text.
    pub(crate) fn fail(&mut self, line: &str, error: RunError) {
        self.has_error = true;
        self.text.push_str(line);
        self.errors.push(error);
    }

    pub(crate) fn has_call(&self, tool_call_id: &str) -> bool {
        self.tool_calls.iter().any(|call| call.tool_call_id == tool_call_id)
    }

    pub(crate) fn record_call(&mut self, call: ToolCallPart) {
        self.tool_calls.push(call);
    }

    /// Records a result if it answers a recorded call that has none yet.
    pub(crate) fn record_result(&mut self, result: ToolResultPart) -> ResultDisposition {
        let id = result.tool_call_id.as_str();
        if !self.has_call(id) {
            warn!(tool_call_id = %id, "Dropping tool result with no matching call");
            return ResultDisposition::Unmatched;
        }
        if self.tool_results.iter().any(|existing| existing.tool_call_id == id) {
            warn!(tool_call_id = %id, "Dropping duplicate tool result");
            return ResultDisposition::Duplicate;
        }
        self.tool_results.push(result);
        ResultDisposition::Recorded
    }

    pub(crate) fn tool_calls(&self) -> &[ToolCallPart] {
        &self.tool_calls
    }

    pub(crate) fn tool_results(&self) -> &[ToolResultPart] {
        &self.tool_results
    }

    pub(crate) fn into_outcome(self, cancelled: bool) -> RunOutcome {
        RunOutcome {
            text: self.text,
            has_error: self.has_error,
            tool_calls: self.tool_calls,
            tool_results: self.tool_results,
            errors: self.errors,
            phases: self.phases,
            cancelled,
        }
    }
}
