//! Stream orchestration for precis.
//!
//! Drives one streaming model completion, runs the URL summarization tool when
//! the model asks for it, and keeps a live display buffer and UI section list
//! up to date while doing so.

pub mod display;
pub mod error;
pub mod orchestration;
pub mod summarize;
pub mod ui;

pub use display::DisplayBuffer;
pub use error::{RunError, ToolError};
pub use orchestration::{
    OrchestratorConfig, RunOutcome, RunPhase, STREAM_ERROR_LINE, SummarizeOrchestrator,
    summarize_failure_notice,
};
pub use summarize::{DEFAULT_SUMMARIZE_BASE_URL, SummarizeClient, Summarizer};
pub use tokio_util::sync::CancellationToken;
pub use ui::{UiSection, UiStream};
