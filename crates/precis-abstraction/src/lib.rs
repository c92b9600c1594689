//! Model abstraction layer for precis.
//!
//! This crate defines the conversation data model, the event vocabulary of a
//! streaming completion, and the `StreamingModel` trait every model endpoint
//! implements.

pub mod message;
pub mod tool;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

pub use message::{ContentPart, ConversationMessage, Role, ToolCallPart, ToolResultPart};
pub use tool::{ToolDeclaration, ToolParameters, ToolPropertySchema};

/// Represents an error that can occur when interacting with an AI model.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// An error occurred during the API request (e.g., network issues, invalid request).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The model returned an error (e.g., invalid input, server failure).
    #[error("Model Response Error: {0}")]
    ModelResponseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// The model provider is not supported or not configured (including rejected credentials).
    #[error("Unsupported Model Provider: {0}")]
    UnsupportedModelProvider(String),

    /// Provider quota exceeded or rate limit hit.
    #[error("Provider '{provider}' quota exceeded{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    QuotaExceeded {
        /// The provider name (e.g., "universal").
        provider: String,
        /// Optional error message from the provider.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Other unexpected errors.
    #[error("Other Model Error: {0}")]
    Other(String),
}

/// One event of a streaming completion, in the order the endpoint produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum StreamEvent {
    /// A fragment of assistant text.
    TextDelta(String),
    /// The model asked for a tool to be executed.
    ToolCall(ToolCallPart),
    /// A tool result surfaced inline by the transport.
    ToolResult(ToolResultPart),
    /// The transport reported an error. Consumers keep draining after it.
    Error(String),
}

/// A single completion request against a streaming endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRequest {
    /// System instruction sent ahead of the conversation.
    pub system: String,
    /// Full conversation history.
    pub messages: Vec<ConversationMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
    /// Tools the model may call.
    pub tools: Vec<ToolDeclaration>,
}

/// Ordered, heterogeneous event sequence returned by a streaming endpoint.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// A model endpoint that answers a conversation with a stream of events.
///
/// All models must be `Send + Sync` so a single instance can serve many runs.
#[async_trait]
pub trait StreamingModel: Send + Sync {
    /// Issues the request and returns the event stream.
    ///
    /// # Errors
    /// Returns a `ModelError` if the request is refused before any event is produced.
    async fn stream(&self, request: StreamRequest) -> Result<EventStream, ModelError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}
