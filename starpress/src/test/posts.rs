//! Write-proxy behavior against a mocked content service.

use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test::utils::{TEST_API_KEY, create_test_app, create_test_config};

#[test_log::test(tokio::test)]
async fn missing_title_returns_400_without_backend_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&mock_server).await;

    let server = create_test_app(create_test_config(&mock_server.uri())).await;

    let response = server.post("/api/posts").json(&json!({"content": "some text"})).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Title and content are required");
}

#[test_log::test(tokio::test)]
async fn empty_content_returns_400_without_backend_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&mock_server).await;

    let server = create_test_app(create_test_config(&mock_server.uri())).await;

    let response = server.post("/api/posts").json(&json!({"title": "hello", "content": "  "})).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Title and content are required");
}

#[test_log::test(tokio::test)]
async fn is_draft_defaults_to_false_and_credential_is_injected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .and(header("X-API-Key", TEST_API_KEY))
        .and(body_json(json!({"title": "hello", "content": "world", "isDraft": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = create_test_app(create_test_config(&mock_server.uri())).await;

    let response = server.post("/api/posts").json(&json!({"title": "hello", "content": "world"})).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({"id": 1}));
}

#[test_log::test(tokio::test)]
async fn is_draft_passes_through_when_provided() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .and(body_json(json!({"title": "hello", "content": "world", "isDraft": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = create_test_app(create_test_config(&mock_server.uri())).await;

    let response = server
        .post("/api/posts")
        .json(&json!({"title": "hello", "content": "world", "isDraft": true}))
        .await;

    assert_eq!(response.status_code(), 200);
}

#[test_log::test(tokio::test)]
async fn missing_credential_returns_500_without_backend_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&mock_server).await;

    let mut config = create_test_config(&mock_server.uri());
    config.backend.api_key = None;
    let server = create_test_app(config).await;

    let response = server.post("/api/posts").json(&json!({"title": "hello", "content": "world"})).await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Server configuration error");
}

#[test_log::test(tokio::test)]
async fn backend_rejection_keeps_status_and_names_status_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad payload"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = create_test_app(create_test_config(&mock_server.uri())).await;

    let response = server.post("/api/posts").json(&json!({"title": "hello", "content": "world"})).await;

    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to submit post:"), "got: {error}");
    assert!(error.contains("Unprocessable Entity"), "got: {error}");
}

#[test_log::test(tokio::test)]
async fn backend_success_body_is_forwarded_verbatim_with_status_200() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7, "slug": "hello-world"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = create_test_app(create_test_config(&mock_server.uri())).await;

    let response = server.post("/api/posts").json(&json!({"title": "hello", "content": "world"})).await;

    // Backend 2xx always surfaces as 200 with the body untouched
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({"id": 7, "slug": "hello-world"}));
}

#[test_log::test(tokio::test)]
async fn unreachable_backend_returns_500() {
    // Nothing listens here
    let server = create_test_app(create_test_config("http://127.0.0.1:1")).await;

    let response = server.post("/api/posts").json(&json!({"title": "hello", "content": "world"})).await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Internal server error");
}

#[test_log::test(tokio::test)]
async fn healthz_answers_ok() {
    let mock_server = MockServer::start().await;
    let server = create_test_app(create_test_config(&mock_server.uri())).await;

    let response = server.get("/healthz").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "OK");
}
