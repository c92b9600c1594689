//! Integration tests for UniversalModel streaming.
//!
//! The mockito tests run everywhere. The live test needs an OpenAI-compatible
//! server and is marked with `#[ignore]`:
//!
//! 1. Start a server (vLLM, LocalAI, LM Studio, ...)
//! 2. Set `UNIVERSAL_BASE_URL` (default `http://localhost:8000/v1`),
//!    `UNIVERSAL_MODEL_ID` and optionally `UNIVERSAL_API_KEY`
//! 3. Run: `cargo test --package precis-models --test universal_integration_test -- --ignored`

use futures::StreamExt;
use precis_abstraction::{
    ConversationMessage, ModelError, StreamEvent, StreamRequest, StreamingModel, ToolDeclaration,
    ToolParameters,
};
use precis_models::{ModelConfig, ModelFactory, ModelType, UniversalModel};
use std::io::Write;

fn request(prompt: &str) -> StreamRequest {
    StreamRequest {
        system: "Answer briefly.".to_string(),
        messages: vec![ConversationMessage::user(prompt)],
        max_tokens: Some(64),
        tools: vec![ToolDeclaration::new(
            "search",
            "Summarize the web page content by provide a url",
            ToolParameters::new().add_property("url", "string", "The URL to summarize", true),
        )],
    }
}

async fn collect(
    model: &dyn StreamingModel,
    request: StreamRequest,
) -> Result<Vec<StreamEvent>, ModelError> {
    Ok(model.stream(request).await?.collect().await)
}

#[tokio::test]
async fn test_chunked_body_split_mid_event() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|w| {
            w.write_all(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel")?;
            w.write_all(b"lo\"}}]}\n")?;
            w.write_all(b"\ndata: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"search\",\"arguments\":\"{\\\"url\\\":\"}}]}}]}\n\n")?;
            w.write_all(b"data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"\\\"https://example.com\\\"}\"}}]},\"finish_reason\":\"tool_calls\"}]}\n\n")?;
            w.write_all(b"data: [DONE]\n\n")
        })
        .create_async()
        .await;

    let model = UniversalModel::without_auth("test-model".to_string(), server.url());
    let events = collect(&model, request("hi")).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::TextDelta("Hello".to_string()));
    match &events[1] {
        StreamEvent::ToolCall(call) => {
            assert_eq!(call.tool_call_id, "call_1");
            assert_eq!(call.args["url"], "https://example.com");
        }
        other => panic!("expected a tool call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_quota_status_maps_to_quota_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"slow down"}}"#)
        .create_async()
        .await;

    let model = ModelFactory::create(
        ModelConfig::new(ModelType::Universal, "test-model".to_string()).with_base_url(server.url()),
    )
    .unwrap();

    let result = collect(model.as_ref(), request("hi")).await;
    assert!(matches!(result, Err(ModelError::QuotaExceeded { .. })));
}

#[tokio::test]
#[ignore = "Requires an OpenAI-compatible server running"]
#[allow(clippy::disallowed_methods)]
async fn test_live_server_streams_text() {
    let base_url = std::env::var("UNIVERSAL_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8000/v1".to_string());
    let model_id =
        std::env::var("UNIVERSAL_MODEL_ID").unwrap_or_else(|_| "gpt-4-turbo".to_string());
    let model = match std::env::var("UNIVERSAL_API_KEY") {
        Ok(key) => UniversalModel::with_api_key(model_id, base_url, key),
        Err(_) => UniversalModel::without_auth(model_id, base_url),
    };

    let events = match collect(&model, request("Say hello in one word")).await {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Live test failed (server may not be running): {}", e);
            return;
        }
    };

    assert!(events.iter().any(|e| matches!(e, StreamEvent::TextDelta(_))));
}
