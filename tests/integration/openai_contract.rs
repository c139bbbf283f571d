//! Chat completion contract tests for `OpenAiClient`.

use std::sync::Arc;
use std::time::Duration;

use nova::error::NovaError;
use nova::interpreter::INTERPRET_INSTRUCTION;
use nova::llm::{ChatRequest, LanguageModel, OpenAiClient};
use nova::{Action, CommandInterpreter, ContextStore, UserId};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        &server.uri(),
        "gpt-4",
        Some("test-key".to_owned()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

#[tokio::test]
async fn request_carries_model_messages_and_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(completion("Hi"))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete(&ChatRequest::new("Be brief.", "Hello"))
        .await
        .unwrap();

    assert_eq!(reply, "Hi");
}

#[tokio::test]
async fn max_tokens_is_sent_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"max_tokens": 150})))
        .respond_with(completion("Captain's log"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new("Rewrite", "log this").with_max_tokens(150);
    let reply = client(&server).complete(&request).await.unwrap();

    assert_eq!(reply, "Captain's log");
}

#[tokio::test]
async fn error_status_is_mapped_with_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&ChatRequest::new("s", "u"))
        .await
        .unwrap_err();

    match err {
        NovaError::Llm(msg) => {
            assert!(msg.contains("401"), "{msg}");
            assert!(msg.contains("Incorrect API key provided"), "{msg}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn reply_without_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let result = client(&server).complete(&ChatRequest::new("s", "u")).await;

    assert!(matches!(result, Err(NovaError::Llm(_))));
}

#[tokio::test]
async fn interpreter_over_http_trims_the_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": INTERPRET_INSTRUCTION},
                {"role": "user", "content": "Command: open my notes\nContext: {}"}
            ]
        })))
        .respond_with(completion("  open notepad \n"))
        .expect(1)
        .mount(&server)
        .await;

    let interpreter =
        CommandInterpreter::new(Arc::new(client(&server)), Arc::new(ContextStore::new()));
    let action = interpreter
        .interpret(&UserId::default(), "open my notes")
        .await;

    assert_eq!(action, Some(Action::new("open notepad")));
}

#[tokio::test]
async fn interpreter_over_http_yields_none_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let interpreter =
        CommandInterpreter::new(Arc::new(client(&server)), Arc::new(ContextStore::new()));

    assert!(
        interpreter
            .interpret(&UserId::default(), "open notepad")
            .await
            .is_none()
    );
}
