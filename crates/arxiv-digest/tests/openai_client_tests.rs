//! Chat completions client tests against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arxiv_digest::client::{ChatSettings, CompletionProvider, OpenAiClient};
use arxiv_digest::config::Config;
use arxiv_digest::error::ClientError;

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn client_for(mock_server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(&Config::for_testing(&mock_server.uri())).unwrap()
}

// =============================================================================
// Requests
// =============================================================================

#[tokio::test]
async fn test_chat_sends_model_messages_and_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "You are a helpful assistant." },
                { "role": "user", "content": "Summarize this" }
            ],
            "max_tokens": 16000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("A summary")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let answer = client_for(&mock_server).complete("Summarize this").await.unwrap();
    assert_eq!(answer, "A summary");
}

#[tokio::test]
async fn test_combine_settings_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "max_tokens": 5000, "top_p": 0.9 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Combined")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let combiner = client_for(&mock_server).with_settings(ChatSettings::combine());
    assert_eq!(combiner.chat("merge").await.unwrap(), "Combined");
}

#[tokio::test]
async fn test_no_auth_header_without_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.openai_api_key = None;
    let client = OpenAiClient::new(&config).unwrap();
    client.chat("hi").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_rate_limit_429() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).chat("x").await.unwrap_err();
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unauthorized_401() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).chat("x").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert!(err.to_string().contains("invalid api key"));
}

#[tokio::test]
async fn test_bad_request_400() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("context length exceeded"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).chat("x").await.unwrap_err();
    assert!(matches!(err, ClientError::BadRequest { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).chat("x").await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }));
}

#[tokio::test]
async fn test_unexpected_status_418() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).chat("x").await.unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus { status: 418, .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("too late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.request_timeout = Duration::from_millis(50);
    let client = OpenAiClient::new(&config).unwrap();

    let err = client.chat("x").await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(t) if t == Duration::from_millis(50)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_empty_choices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).chat("x").await.unwrap_err();
    assert!(matches!(err, ClientError::EmptyCompletion));
}

#[tokio::test]
async fn test_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).chat("x").await.unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
}
