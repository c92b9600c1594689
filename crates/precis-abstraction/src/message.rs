//! Conversation history types.
//!
//! A history is an ordered list of [`ConversationMessage`]s owned by the caller.
//! Each message carries an ordered list of content parts: plain text, tool-call
//! descriptors produced by the model, or tool-result descriptors produced by a
//! tool invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The model.
    Assistant,
    /// Results of tool executions.
    Tool,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool call emitted by the model. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPart {
    /// Identifier correlating the call with its result.
    pub tool_call_id: String,
    /// Name of the declared tool.
    pub tool_name: String,
    /// Argument payload.
    pub args: Value,
}

impl ToolCallPart {
    /// Creates a tool call descriptor.
    pub fn new(tool_call_id: impl Into<String>, tool_name: impl Into<String>, args: Value) -> Self {
        Self { tool_call_id: tool_call_id.into(), tool_name: tool_name.into(), args }
    }
}

/// The outcome of one tool call. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultPart {
    /// Identifier of the call this result answers.
    pub tool_call_id: String,
    /// Name of the tool that produced the result.
    pub tool_name: String,
    /// Result payload, or the error message when `is_error` is set.
    pub result: Value,
    /// Marks a failed invocation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResultPart {
    /// Successful result for `call`.
    pub fn success(call: &ToolCallPart, result: Value) -> Self {
        Self {
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.tool_name.clone(),
            result,
            is_error: false,
        }
    }

    /// Error-marked result for `call`.
    pub fn error(call: &ToolCallPart, message: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.tool_name.clone(),
            result: Value::String(message.into()),
            is_error: true,
        }
    }
}

/// One part of a message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
    },
    /// A tool call descriptor.
    ToolCall(ToolCallPart),
    /// A tool result descriptor.
    ToolResult(ToolResultPart),
}

/// A message in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Author of the message.
    pub role: Role,
    /// Ordered content parts.
    pub content: Vec<ContentPart>,
}

impl ConversationMessage {
    /// A user message holding a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: vec![ContentPart::Text { text: text.into() }] }
    }

    /// An assistant message: the text first, then every tool call in order.
    pub fn assistant(text: impl Into<String>, calls: impl IntoIterator<Item = ToolCallPart>) -> Self {
        let mut content = vec![ContentPart::Text { text: text.into() }];
        content.extend(calls.into_iter().map(ContentPart::ToolCall));
        Self { role: Role::Assistant, content }
    }

    /// A tool message carrying results in encounter order.
    pub fn tool(results: impl IntoIterator<Item = ToolResultPart>) -> Self {
        Self {
            role: Role::Tool,
            content: results.into_iter().map(ContentPart::ToolResult).collect(),
        }
    }

    /// Concatenation of every text part.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool calls carried by this message.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallPart> {
        self.content.iter().filter_map(|part| match part {
            ContentPart::ToolCall(call) => Some(call),
            _ => None,
        })
    }

    /// Tool results carried by this message.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResultPart> {
        self.content.iter().filter_map(|part| match part {
            ContentPart::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}
