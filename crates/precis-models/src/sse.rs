// Server-Sent Events decoding for OpenAI-compatible chat completion streams.
//
// Bytes arrive in arbitrary chunks. Events are separated by a blank line and
// carry one or more `data:` lines. Text deltas are emitted as soon as they are
// decoded; tool-call fragments are merged per `index` and only emitted once the
// choice reports a finish reason, the server sends `[DONE]`, or the body ends.

use precis_abstraction::{StreamEvent, ToolCallPart};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Incremental decoder turning raw SSE bytes into stream events.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    partial_calls: BTreeMap<u32, PartialToolCall>,
    done: bool,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

impl SseDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True once `[DONE]` was seen or `finish` was called.
    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds a chunk of the response body and returns the events it completed.
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        // Line terminators may be CRLF; raw CR never appears inside JSON payloads.
        self.buffer.extend(bytes.iter().copied().filter(|&b| b != b'\r'));

        while let Some(end_idx) = find_blank_line(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end_idx + 2).collect();
            self.process_event(&raw[..end_idx], &mut events);
            if self.done {
                self.buffer.clear();
                break;
            }
        }

        events
    }

    /// Signals the end of the body and flushes anything still pending.
    pub(crate) fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            self.process_event(&raw, &mut events);
        }
        self.flush_calls(&mut events);
        self.done = true;
        events
    }

    fn process_event(&mut self, raw: &[u8], events: &mut Vec<StreamEvent>) {
        let text = String::from_utf8_lossy(raw);
        let data: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
            .collect();
        if data.is_empty() {
            return;
        }
        let data = data.join("\n");

        if data.trim() == "[DONE]" {
            self.flush_calls(events);
            self.done = true;
            return;
        }

        let chunk = match serde_json::from_str::<OpenAIStreamingResponse>(&data) {
            Ok(chunk) => chunk,
            Err(e) => {
                // Skip malformed JSON chunks (some servers send keep-alive noise)
                debug!("Failed to parse SSE chunk: {}", e);
                return;
            }
        };

        if let Some(error) = chunk.error {
            events.push(StreamEvent::Error(error_message(&error)));
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return;
        };

        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                events.push(StreamEvent::TextDelta(content));
            }
        }

        for fragment in choice.delta.tool_calls {
            let partial = self.partial_calls.entry(fragment.index).or_default();
            if let Some(id) = fragment.id {
                partial.id = Some(id);
            }
            if let Some(function) = fragment.function {
                if let Some(name) = function.name {
                    partial.name.push_str(&name);
                }
                if let Some(arguments) = function.arguments {
                    partial.arguments.push_str(&arguments);
                }
            }
        }

        if choice.finish_reason.is_some() {
            self.flush_calls(events);
        }
    }

    fn flush_calls(&mut self, events: &mut Vec<StreamEvent>) {
        for (index, partial) in std::mem::take(&mut self.partial_calls) {
            if partial.name.is_empty() {
                debug!(index, tool_call_id = ?partial.id, "Dropping tool call without a function name");
                events.push(StreamEvent::Error(format!(
                    "Tool call at index {} has no function name",
                    index
                )));
                continue;
            }

            let args = if partial.arguments.trim().is_empty() {
                Ok(Value::Object(serde_json::Map::new()))
            } else {
                serde_json::from_str::<Value>(&partial.arguments)
            };

            match args {
                Ok(args) => {
                    let id = partial.id.unwrap_or_else(|| format!("call_{}", index));
                    events.push(StreamEvent::ToolCall(ToolCallPart::new(id, partial.name, args)));
                }
                Err(e) => {
                    events.push(StreamEvent::Error(format!(
                        "Invalid arguments for tool call '{}': {}",
                        partial.name, e
                    )));
                }
            }
        }
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| other.to_string(), str::to_string),
    }
}

// Streaming response structures

#[derive(Debug, Deserialize)]
struct OpenAIStreamingResponse {
    #[serde(default)]
    choices: Vec<OpenAIStreamingChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamingChoice {
    #[serde(default)]
    delta: OpenAIStreamingDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIStreamingDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAIToolCallDelta>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCallDelta {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<OpenAIFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_all(chunks: &[&[u8]]) -> Vec<StreamEvent> {
        let mut decoder = SseDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed(chunk));
        }
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_text_deltas_in_order() {
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\ndata: [DONE]\n\n";
        let events = decode_all(&[body]);
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("Hello".to_string()),
                StreamEvent::TextDelta(" world".to_string()),
            ]
        );
    }

    #[test]
    fn test_event_split_across_chunks_and_utf8_boundary() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo\"}}]}\n\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = body.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let events = decode_all(&[&body[..split], &body[split..]]);
        assert_eq!(events, vec![StreamEvent::TextDelta("héllo".to_string())]);
    }

    #[test]
    fn test_crlf_separated_events() {
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n\r\ndata: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\r\n\r\n";
        let events = decode_all(&[body]);
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta("a".to_string()), StreamEvent::TextDelta("b".to_string())]
        );
    }

    #[test]
    fn test_tool_call_fragments_are_merged() {
        let chunks: [&[u8]; 4] = [
            b"data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"type\":\"function\",\"function\":{\"name\":\"search\",\"arguments\":\"\"}}]}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{\\\"url\\\":\"}}]}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"\\\"https://example.com\\\"}\"}}]}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\ndata: [DONE]\n\n",
        ];
        let events = decode_all(&chunks);
        assert_eq!(
            events,
            vec![StreamEvent::ToolCall(ToolCallPart::new(
                "call_1",
                "search",
                json!({"url": "https://example.com"})
            ))]
        );
    }

    #[test]
    fn test_pending_tool_call_flushed_at_end_of_body() {
        let body = b"data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_9\",\"function\":{\"name\":\"search\",\"arguments\":\"{}\"}}]}}]}\n\n";
        let events = decode_all(&[body]);
        assert_eq!(events, vec![StreamEvent::ToolCall(ToolCallPart::new("call_9", "search", json!({})))]);
    }

    #[test]
    fn test_invalid_tool_arguments_become_error() {
        let body = b"data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"search\",\"arguments\":\"{not json\"}}]},\"finish_reason\":\"tool_calls\"}]}\n\n";
        let events = decode_all(&[body]);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamEvent::Error(msg) if msg.contains("search")));
    }

    #[test]
    fn test_nameless_tool_call_becomes_error() {
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"Looking\",\"tool_calls\":[{\"index\":2,\"id\":\"call_7\",\"function\":{\"arguments\":\"{}\"}}]},\"finish_reason\":\"tool_calls\"}]}\n\n";
        let events = decode_all(&[body]);
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("Looking".to_string()),
                StreamEvent::Error("Tool call at index 2 has no function name".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_chunk_and_malformed_chunk() {
        let body = b"data: not json\n\ndata: {\"error\":{\"message\":\"overloaded\"}}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"still here\"}}]}\n\n";
        let events = decode_all(&[body]);
        assert_eq!(
            events,
            vec![
                StreamEvent::Error("overloaded".to_string()),
                StreamEvent::TextDelta("still here".to_string()),
            ]
        );
    }

    #[test]
    fn test_done_stops_decoding() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n");
        assert!(events.is_empty());
        assert!(decoder.is_done());
        assert!(decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"later\"}}]}\n\n").is_empty());
    }

    #[test]
    fn test_trailing_event_without_blank_line() {
        let events = decode_all(&[b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}"]);
        assert_eq!(events, vec![StreamEvent::TextDelta("tail".to_string())]);
    }
}
