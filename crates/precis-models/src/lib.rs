//! Model implementations for precis.
//!
//! This crate provides concrete implementations of the `StreamingModel` trait.
//!
//! # Supported Providers
//!
//! - **Universal**: any OpenAI-compatible chat completions endpoint (API key optional)
//! - **Scripted**: replays a fixed event sequence, for tests and offline runs

pub mod factory;
mod sse;
pub mod universal;

use async_trait::async_trait;
use futures::stream;
use precis_abstraction::{EventStream, ModelError, StreamEvent, StreamRequest, StreamingModel};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub use factory::{ModelConfig, ModelFactory, ModelType};
pub use universal::UniversalModel;

/// A `StreamingModel` that replays a scripted event sequence.
///
/// Every request it receives is recorded so tests can inspect what the
/// orchestrator sent.
#[derive(Debug)]
pub struct ScriptedModel {
    id: String,
    outcome: Result<Vec<StreamEvent>, ModelError>,
    requests: Mutex<Vec<StreamRequest>>,
}

impl ScriptedModel {
    /// Creates a model that answers every request with `events`.
    #[must_use]
    pub fn new(id: impl Into<String>, events: Vec<StreamEvent>) -> Self {
        Self { id: id.into(), outcome: Ok(events), requests: Mutex::new(Vec::new()) }
    }

    /// Creates a model that refuses every request with `error`.
    #[must_use]
    pub fn failing(id: impl Into<String>, error: ModelError) -> Self {
        Self { id: id.into(), outcome: Err(error), requests: Mutex::new(Vec::new()) }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<StreamRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl StreamingModel for ScriptedModel {
    async fn stream(&self, request: StreamRequest) -> Result<EventStream, ModelError> {
        debug!(
            model_id = %self.id,
            message_count = request.messages.len(),
            "ScriptedModel replaying events"
        );

        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);

        match &self.outcome {
            Ok(events) => Ok(Box::pin(stream::iter(events.clone()))),
            Err(error) => Err(error.clone()),
        }
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}
