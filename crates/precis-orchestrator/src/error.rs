// Error types for orchestration
//
// Nothing here is fatal to a run: the orchestrator converts every error into
// visible answer text plus a flag, and keeps a structured record in the outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ToolError {
    /// The request never produced a response (DNS, connect, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("Summarize service returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body was not the expected `{"data": ...}` envelope.
    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    /// The model supplied arguments the tool cannot use.
    #[error("Invalid tool arguments for '{tool}': {reason}")]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// Reason why arguments are invalid
        reason: String,
    },

    /// The model called a tool that was never declared.
    #[error("Tool '{0}' is not declared")]
    UnknownTool(String),

    /// The run was cancelled while the tool was in flight.
    #[error("Tool invocation cancelled")]
    Cancelled,
}

/// A recovered error recorded during one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunError {
    /// The tool invoker failed for a call.
    #[error("Tool call '{tool_call_id}' failed: {error}")]
    ToolInvocation {
        /// Identifier of the failed call
        tool_call_id: String,
        /// What went wrong
        error: ToolError,
    },

    /// The model transport signalled an error.
    #[error("Stream error: {message}")]
    Stream {
        /// Message reported by the transport
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ToolError::HttpStatus(500).to_string(), "Summarize service returned HTTP 500");
        let err = RunError::ToolInvocation {
            tool_call_id: "call_1".to_string(),
            error: ToolError::UnknownTool("browse".to_string()),
        };
        assert_eq!(err.to_string(), "Tool call 'call_1' failed: Tool 'browse' is not declared");
    }
}
