//! Token provider tests against a mock IAM endpoint.

use huddle::provider::TokenProvider;
use huddle::AssistantError;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> TokenProvider {
    TokenProvider::new(
        reqwest::Client::new(),
        &format!("{}/identity/token", server.uri()),
        "test-api-key",
    )
}

fn token_response(token: &str, expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "refresh_token": "not_supported",
        "token_type": "Bearer",
        "expires_in": expires_in,
    }))
}

#[tokio::test]
async fn test_second_call_reuses_cached_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(
            "grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey",
        ))
        .and(body_string_contains("apikey=test-api-key"))
        .respond_with(token_response("token-1", 3600))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = provider(&server);
    let first = tokens.get_token().await.unwrap();
    let second = tokens.get_token().await.unwrap();

    assert_eq!(first, "token-1");
    assert_eq!(second, "token-1");
}

#[tokio::test]
async fn test_token_inside_refresh_margin_is_exchanged_again() {
    let server = MockServer::start().await;

    // 60s of validity is already inside the 5 minute refresh margin.
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(token_response("short-lived", 60))
        .expect(2)
        .mount(&server)
        .await;

    let tokens = provider(&server);
    tokens.get_token().await.unwrap();
    tokens.get_token().await.unwrap();
}

#[tokio::test]
async fn test_invalidate_forces_new_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(token_response("token", 3600))
        .expect(2)
        .mount(&server)
        .await;

    let tokens = provider(&server);
    tokens.get_token().await.unwrap();
    tokens.invalidate().await;
    tokens.get_token().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_callers_share_one_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(token_response("shared", 3600))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = std::sync::Arc::new(provider(&server));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tokens = tokens.clone();
            tokio::spawn(async move { tokens.get_token().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "shared");
    }
}

#[tokio::test]
async fn test_rejected_api_key_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "BXNIM0415E",
            "errorMessage": "Provided API key could not be found.",
        })))
        .mount(&server)
        .await;

    let err = provider(&server).get_token().await.unwrap_err();
    assert!(matches!(err, AssistantError::Auth(_)));
    assert!(err.to_string().contains("400"));
}

#[tokio::test]
async fn test_malformed_token_response_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server).get_token().await.unwrap_err();
    assert!(matches!(err, AssistantError::Auth(_)));
}

#[tokio::test]
async fn test_out_of_range_expiry_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(token_response("t", u64::MAX))
        .mount(&server)
        .await;

    let err = provider(&server).get_token().await.unwrap_err();
    assert!(matches!(err, AssistantError::Auth(_)));
    assert!(err.to_string().contains("expires_in"));
}
