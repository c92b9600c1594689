// Orchestration module - streaming completion with a mid-stream summarization tool
//
// A run issues one completion request, drains the model's event stream, runs the
// summarization tool whenever the model calls it, and folds everything into the
// conversation history once the stream is exhausted.

pub mod config;
pub mod engine;
mod state;

use precis_abstraction::{ToolCallPart, ToolResultPart};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RunError;

pub use config::OrchestratorConfig;
pub use engine::SummarizeOrchestrator;

/// Appended to the answer when the model stream reports an error.
pub const STREAM_ERROR_LINE: &str = "\nError occurred while executing the tool";

/// Phases of one orchestration run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Request not yet issued
    Idle,
    /// Draining model events
    Streaming,
    /// Waiting on the tool invoker
    ToolPending,
    /// Stream exhausted and history appended
    Completed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Streaming => write!(f, "streaming"),
            Self::ToolPending => write!(f, "tool_pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// What a finished run hands back to its caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunOutcome {
    /// Accumulated answer text, diagnostic lines included
    pub text: String,
    /// Whether any tool or stream error occurred
    pub has_error: bool,
    /// Tool calls in encounter order
    pub tool_calls: Vec<ToolCallPart>,
    /// Tool results in encounter order
    pub tool_results: Vec<ToolResultPart>,
    /// Recovered errors in encounter order
    pub errors: Vec<RunError>,
    /// Phase trace, starting at `Idle` and ending at `Completed`
    pub phases: Vec<RunPhase>,
    /// Whether the run stopped on cancellation
    pub cancelled: bool,
}

impl RunOutcome {
    /// Whether the tool invoker ran during this run.
    pub fn tool_ran(&self) -> bool {
        self.phases.contains(&RunPhase::ToolPending)
    }
}

/// Message shown when summarizing `url` failed.
pub fn summarize_failure_notice(url: &str) -> String {
    format!("An error occurred while summarizing for \"{url}\".")
}
