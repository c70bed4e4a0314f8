//! Unit tests for registry client

use super::*;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_client() -> RegistryClient {
    RegistryClient::with_retry_config(RetryConfig {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    })
    .unwrap()
}

#[tokio::test]
async fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.multiplier, 2.0);

    let client = RegistryClient::new().unwrap();
    assert_eq!(client.retry_config().max_retries, 3);
}

#[tokio::test]
async fn test_get_json_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "foo" })))
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let body: Option<serde_json::Value> = client
        .get_json(&format!("{}/foo", mock_server.uri()), None)
        .await
        .unwrap();

    assert_eq!(body.unwrap()["name"], "foo");
}

#[tokio::test]
async fn test_not_found_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let url = format!("{}/missing", mock_server.uri());

    let json: Option<serde_json::Value> = client.get_json(&url, None).await.unwrap();
    assert!(json.is_none());
    assert!(client.get_bytes(&url, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_bytes_with_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/-/foo-1.0.0.tgz"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let bytes = client
        .get_bytes(&format!("{}/foo/-/foo-1.0.0.tgz", mock_server.uri()), Some("secret"))
        .await
        .unwrap();

    assert_eq!(bytes, Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let bytes = client
        .get_bytes(&format!("{}/flaky", mock_server.uri()), None)
        .await
        .unwrap();

    assert_eq!(bytes, Some(b"ok".to_vec()));
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let result = client.get_bytes(&format!("{}/down", mock_server.uri()), None).await;

    match result {
        Err(RegistryError::Network { message, .. }) => assert!(message.contains("500")),
        other => panic!("Expected Network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let result = client.get_bytes(&format!("{}/forbidden", mock_server.uri()), None).await;

    assert!(matches!(result, Err(RegistryError::Network { .. })));
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let result: RetrieverResult<Option<serde_json::Value>> =
        client.get_json(&format!("{}/foo", mock_server.uri()), None).await;

    assert!(matches!(result, Err(RegistryError::Network { .. })));
}

#[tokio::test]
async fn test_connection_refused() {
    let client = fast_client();
    let result = client.get_bytes("http://127.0.0.1:1/unreachable", None).await;

    assert!(matches!(result, Err(RegistryError::Network { .. })));
}
