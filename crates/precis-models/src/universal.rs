//! Universal OpenAI-compatible streaming model.
//!
//! This module implements `StreamingModel` for any server that speaks the OpenAI
//! Chat Completions API with `stream: true`: the hosted OpenAI API, proxies in
//! front of it, vLLM, LocalAI, LM Studio, Ollama's compatible endpoint, and so on.
//!
//! # Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use precis_abstraction::{ConversationMessage, StreamEvent, StreamRequest, StreamingModel};
//! use precis_models::UniversalModel;
//!
//! # async fn example() -> Result<(), precis_abstraction::ModelError> {
//! let model = UniversalModel::without_auth(
//!     "llama-3-8b".to_string(),
//!     "http://localhost:1234/v1".to_string(),
//! );
//!
//! let request = StreamRequest {
//!     system: "Be brief.".to_string(),
//!     messages: vec![ConversationMessage::user("Say hello")],
//!     max_tokens: Some(64),
//!     tools: vec![],
//! };
//!
//! let mut events = model.stream(request).await?;
//! while let Some(event) = events.next().await {
//!     if let StreamEvent::TextDelta(delta) = event {
//!         print!("{}", delta);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Constructor Patterns
//!
//! - `with_api_key()` - Explicit API key for authenticated servers
//! - `without_auth()` - No authentication (most common for local servers)

use async_trait::async_trait;
use futures::Stream;
use precis_abstraction::{
    ConversationMessage, EventStream, ModelError, Role, StreamEvent, StreamRequest,
    StreamingModel, ToolDeclaration, ToolParameters,
};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tracing::{debug, error};

use crate::sse::SseDecoder;

/// Default endpoint when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// Streams can legitimately run for minutes; only guard against dead peers.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Universal OpenAI-compatible model implementation.
#[derive(Debug, Clone)]
pub struct UniversalModel {
    /// The model identifier (e.g., "gpt-4-turbo", "llama-3-70b").
    model_id: String,
    /// Base URL for the API endpoint (e.g., "http://localhost:8000/v1").
    base_url: String,
    /// Optional API key (some local servers don't require auth).
    api_key: Option<String>,
    /// HTTP client for requests.
    client: Client,
}

impl UniversalModel {
    /// Creates a new `UniversalModel` with an explicit API key.
    #[must_use]
    pub fn with_api_key(model_id: String, base_url: String, api_key: String) -> Self {
        Self::build(model_id, base_url, Some(api_key))
    }

    /// Creates a new `UniversalModel` without authentication.
    #[must_use]
    pub fn without_auth(model_id: String, base_url: String) -> Self {
        Self::build(model_id, base_url, None)
    }

    fn build(model_id: String, base_url: String, api_key: Option<String>) -> Self {
        Self {
            model_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request_body(&self, request: &StreamRequest) -> OpenAIStreamingRequest {
        OpenAIStreamingRequest {
            model: self.model_id.clone(),
            messages: to_openai_messages(&request.system, &request.messages),
            stream: true,
            max_tokens: request.max_tokens,
            tools: request.tools.iter().map(OpenAITool::from_declaration).collect(),
        }
    }
}

#[async_trait]
impl StreamingModel for UniversalModel {
    async fn stream(&self, request: StreamRequest) -> Result<EventStream, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = request.messages.len(),
            tool_count = request.tools.len(),
            max_tokens = ?request.max_tokens,
            "UniversalModel generating streaming chat completion"
        );

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let mut http_request = self.client.post(&url).json(&body);

        // Add Bearer auth if API key is present
        if let Some(ref api_key) = self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(|e| {
            error!(
                error = %e,
                url = %url,
                "Failed to send streaming request to OpenAI-compatible API"
            );
            ModelError::RequestError(format!("Network error: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                url = %url,
                "OpenAI-compatible API returned error status for streaming request"
            );
            return Err(map_status_error(status, error_text));
        }

        Ok(Box::pin(SSEStream::new(response)))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn map_status_error(status: StatusCode, error_text: String) -> ModelError {
    match status.as_u16() {
        401 | 403 => ModelError::UnsupportedModelProvider(format!(
            "Authentication failed ({}): {}",
            status, error_text
        )),
        402 | 429 => ModelError::QuotaExceeded {
            provider: "universal".to_string(),
            message: Some(error_text),
        },
        500..=599 => {
            ModelError::ModelResponseError(format!("Server error ({}): {}", status, error_text))
        }
        _ => ModelError::ModelResponseError(format!("API error ({}): {}", status, error_text)),
    }
}

/// Converts the history into OpenAI wire messages, system prompt first.
///
/// Tool results are split into one `tool` message per result, as the API
/// requires a `tool_call_id` per message.
fn to_openai_messages(system: &str, messages: &[ConversationMessage]) -> Vec<OpenAIMessage> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    if !system.is_empty() {
        out.push(OpenAIMessage::text("system", system.to_string()));
    }

    for message in messages {
        match message.role {
            Role::User => out.push(OpenAIMessage::text("user", message.text())),
            Role::Assistant => {
                let text = message.text();
                let tool_calls: Vec<OpenAIToolCall> = message
                    .tool_calls()
                    .map(|call| OpenAIToolCall {
                        id: call.tool_call_id.clone(),
                        kind: "function",
                        function: OpenAIFunctionCall {
                            name: call.tool_name.clone(),
                            arguments: call.args.to_string(),
                        },
                    })
                    .collect();
                let content = if text.is_empty() && !tool_calls.is_empty() { None } else { Some(text) };
                out.push(OpenAIMessage {
                    role: "assistant",
                    content,
                    tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
                    tool_call_id: None,
                });
            }
            Role::Tool => {
                for result in message.tool_results() {
                    let content = match &result.result {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    out.push(OpenAIMessage {
                        role: "tool",
                        content: Some(content),
                        tool_calls: None,
                        tool_call_id: Some(result.tool_call_id.clone()),
                    });
                }
            }
        }
    }

    out
}

// Streaming response adapter: feeds body chunks through the SSE decoder and
// yields decoded events one at a time.
struct SSEStream {
    stream: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    decoder: SseDecoder,
    pending: VecDeque<StreamEvent>,
    finished: bool,
}

impl SSEStream {
    fn new(response: reqwest::Response) -> Self {
        Self {
            stream: Box::pin(response.bytes_stream()),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }
}

impl Stream for SSEStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Poll::Ready(Some(event));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            match self.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    let events = self.decoder.feed(&bytes);
                    self.pending.extend(events);
                    if self.decoder.is_done() {
                        self.finished = true;
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    error!(error = %e, "SSE body failed mid-stream");
                    self.pending.push_back(StreamEvent::Error(format!("Stream error: {}", e)));
                    self.finished = true;
                }
                Poll::Ready(None) => {
                    let events = self.decoder.finish();
                    self.pending.extend(events);
                    self.finished = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

// OpenAI-compatible API request structures

#[derive(Debug, Serialize)]
struct OpenAIStreamingRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAITool>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAIMessage {
    fn text(role: &'static str, content: String) -> Self {
        Self { role, content: Some(content), tool_calls: None, tool_call_id: None }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAIFunctionDeclaration,
}

impl OpenAITool {
    fn from_declaration(declaration: &ToolDeclaration) -> Self {
        Self {
            kind: "function",
            function: OpenAIFunctionDeclaration {
                name: declaration.name.clone(),
                description: declaration.description.clone(),
                parameters: declaration.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionDeclaration {
    name: String,
    description: String,
    parameters: ToolParameters,
}
