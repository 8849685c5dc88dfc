//! Tests for the HTTP client module

use super::*;
use crate::auth::{InvalidationReason, SessionEvent};
use crate::error::Error;
use crate::store::{CredentialKey, CredentialStore, Credentials, MemoryCredentialStore};
use crate::types::RefreshPolicy;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFRESH_PATH: &str = "/auth/token/refresh/";

fn client_for(server: &MockServer, store: &MemoryCredentialStore) -> AuthenticatedClient {
    client_with_policy(server, store, RefreshPolicy::Independent)
}

fn client_with_policy(
    server: &MockServer,
    store: &MemoryCredentialStore,
    policy: RefreshPolicy,
) -> AuthenticatedClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .refresh_policy(policy)
        .build();
    AuthenticatedClient::new(config, Arc::new(store.clone())).unwrap()
}

async fn logged_in_store(access: &str, refresh: &str) -> MemoryCredentialStore {
    let store = MemoryCredentialStore::new();
    store
        .save_login(
            Credentials::new(access, refresh),
            &json!({"id": 1, "role": "patient"}),
        )
        .await
        .unwrap();
    store
}

async fn assert_store_empty(store: &MemoryCredentialStore) {
    for key in CredentialKey::ALL {
        assert!(store.get(key).await.unwrap().is_none(), "{key} still stored");
    }
}

/// URL of a local port with nothing listening on it
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

async fn requests_with_bearer(server: &MockServer, token: &str) -> usize {
    let expected = format!("Bearer {token}");
    let requests = server.received_requests().await.unwrap();
    requests
        .iter()
        .filter(|r| {
            r.headers
                .get("authorization")
                .is_some_and(|v| v.as_bytes() == expected.as_bytes())
        })
        .count()
}

/// Store whose `clear` always fails
#[derive(Debug, Clone, Default)]
struct UnclearableStore {
    inner: MemoryCredentialStore,
}

#[async_trait::async_trait]
impl CredentialStore for UnclearableStore {
    async fn get(&self, key: CredentialKey) -> crate::error::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: CredentialKey, value: String) -> crate::error::Result<()> {
        self.inner.set(key, value).await
    }

    async fn clear(&self) -> crate::error::Result<()> {
        Err(Error::store("disk full"))
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.base_url.is_none());
    assert_eq!(config.refresh_path, DEFAULT_REFRESH_PATH);
    assert_eq!(config.refresh_policy, RefreshPolicy::Independent);
    assert!(config.user_agent.starts_with("clinic-client/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.clinic.test")
        .timeout(Duration::from_secs(5))
        .refresh_path("/token/refresh")
        .refresh_policy(RefreshPolicy::SingleFlight)
        .header("X-Client", "cli")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.clinic.test".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.refresh_path, "/token/refresh");
    assert_eq!(config.refresh_policy, RefreshPolicy::SingleFlight);
    assert_eq!(
        config.default_headers.get("X-Client"),
        Some(&"cli".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_api_request_builder() {
    let request = ApiRequest::post("/appointments/")
        .query("page", "2")
        .header("X-Request-Id", "abc123")
        .json(json!({"doctor": 4}))
        .timeout(Duration::from_secs(10));

    assert_eq!(request.method, crate::types::Method::POST);
    assert_eq!(request.path, "/appointments/");
    assert_eq!(request.query.get("page"), Some(&"2".to_string()));
    assert_eq!(
        request.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert_eq!(request.body, Some(json!({"doctor": 4})));
    assert_eq!(request.timeout, Some(Duration::from_secs(10)));
}

#[test]
fn test_client_requires_base_url() {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
    let err = AuthenticatedClient::new(HttpClientConfig::default(), store).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[test]
fn test_client_rejects_invalid_base_url() {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
    let config = HttpClientConfig::builder().base_url("not a url").build();
    let err = AuthenticatedClient::new(config, store).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

// ============================================================================
// Bearer attachment
// ============================================================================

#[tokio::test]
async fn test_no_token_sends_unauthenticated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = MemoryCredentialStore::new();
    let client = client_for(&mock_server, &store);
    let response = client.get("/doctors/").await.unwrap();

    assert_eq!(response.status(), 200);
    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_valid_token_attached_and_response_unchanged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "status": "scheduled"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);
    let response = client.get("/appointments/").await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body[0]["status"], "scheduled");
}

#[tokio::test]
async fn test_query_headers_and_body_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/appointments/"))
        .and(query_param("notify", "true"))
        .and(header("X-Request-Id", "req-456"))
        .and(header("X-Client", "cli"))
        .and(body_json(json!({"doctor": 4, "date": "2026-11-02"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = MemoryCredentialStore::new();
    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .header("X-Client", "cli")
        .build();
    let client = AuthenticatedClient::new(config, Arc::new(store)).unwrap();

    let response = client
        .send(
            ApiRequest::post("appointments/")
                .query("notify", "true")
                .header("X-Request-Id", "req-456")
                .json(json!({"doctor": 4, "date": "2026-11-02"})),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
}

// ============================================================================
// Refresh and retry
// ============================================================================

#[tokio::test]
async fn test_expired_token_refreshed_once_and_retried_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/medical-records/"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "token_not_valid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/medical-records/"))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 9}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);
    let mut events = client.subscribe();

    let response = client.get("/medical-records/").await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body[0]["id"], 9);

    // New access token stored, refresh token not rotated, user kept
    assert_eq!(
        store.get(CredentialKey::AccessToken).await.unwrap(),
        Some("T2".to_string())
    );
    assert_eq!(
        store.get(CredentialKey::RefreshToken).await.unwrap(),
        Some("R1".to_string())
    );
    assert!(store.get(CredentialKey::User).await.unwrap().is_some());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Refreshed);
}

#[tokio::test]
async fn test_retry_resends_original_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/appointments/5/reschedule/"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/appointments/5/reschedule/"))
        .and(header("Authorization", "Bearer T2"))
        .and(body_json(json!({"date": "2026-11-03", "time": "10:30"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);

    let response = client
        .post(
            "/appointments/5/reschedule/",
            json!({"date": "2026-11-03", "time": "10:30"}),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_second_401_returned_without_second_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);

    let response = client.get("/patients/").await.unwrap();
    assert_eq!(response.status(), 401);

    // The refreshed session is left in place
    assert_eq!(
        store.get(CredentialKey::AccessToken).await.unwrap(),
        Some("T2".to_string())
    );
}

#[tokio::test]
async fn test_missing_refresh_token_short_circuits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = MemoryCredentialStore::new();
    store
        .set(CredentialKey::AccessToken, "T1".to_string())
        .await
        .unwrap();
    store
        .set(CredentialKey::User, r#"{"id":1}"#.to_string())
        .await
        .unwrap();

    let client = client_for(&mock_server, &store);
    let mut events = client.subscribe();

    let err = client.get("/appointments/").await.unwrap_err();

    assert!(matches!(err, Error::ReauthRequired { .. }));
    assert!(err.is_auth_failure());
    assert_store_empty(&store).await;
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Invalidated {
            reason: InvalidationReason::MissingRefreshToken
        }
    );
}

#[tokio::test]
async fn test_empty_refresh_token_treated_as_missing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "").await;
    let client = client_for(&mock_server, &store);

    let err = client.get("/appointments/").await.unwrap_err();
    assert!(matches!(err, Error::ReauthRequired { .. }));
    assert_store_empty(&store).await;
}

#[tokio::test]
async fn test_refresh_rejected_clears_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/medical-records/3/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R-expired").await;
    let client = client_for(&mock_server, &store);
    let mut events = client.subscribe();

    let err = client.get("/medical-records/3/").await.unwrap_err();

    assert!(matches!(err, Error::TokenRefresh { .. }));
    assert!(err.is_auth_failure());
    assert_store_empty(&store).await;
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Invalidated {
            reason: InvalidationReason::RefreshFailed
        }
    );
}

#[tokio::test]
async fn test_malformed_refresh_body_clears_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);

    let err = client.get("/appointments/").await.unwrap_err();

    assert!(matches!(err, Error::TokenRefresh { .. }));
    assert_store_empty(&store).await;
}

// ============================================================================
// Pass-through of other failures
// ============================================================================

#[tokio::test]
async fn test_non_401_errors_pass_through_untouched() {
    for status in [400_u16, 403, 404, 500, 503] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/appointments/"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let store = logged_in_store("T1", "R1").await;
        let client = client_for(&mock_server, &store);

        let response = client.get("/appointments/").await.unwrap();
        assert_eq!(response.status().as_u16(), status);
        assert_eq!(
            store.credentials().await.unwrap(),
            Some(Credentials::new("T1", "R1"))
        );
    }
}

#[tokio::test]
async fn test_transport_error_propagated_without_store_mutation() {
    let uri = closed_port_uri();

    let store = logged_in_store("T1", "R1").await;
    let config = HttpClientConfig::builder()
        .base_url(uri)
        .timeout(Duration::from_secs(2))
        .build();
    let client = AuthenticatedClient::new(config, Arc::new(store.clone())).unwrap();

    let err = client.get("/appointments/").await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert!(!err.is_auth_failure());
    assert_eq!(
        store.credentials().await.unwrap(),
        Some(Credentials::new("T1", "R1"))
    );
}

#[tokio::test]
async fn test_send_json_maps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/77/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found."))
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);

    let err = client
        .send_json::<serde_json::Value>(ApiRequest::get("/appointments/77/"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Not found."));
}

// ============================================================================
// Concurrency
// ============================================================================

/// Both requests read T1 before either 401 arrives
async fn mount_slow_expired_endpoint(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(200)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrent_requests_refresh_independently() {
    let mock_server = MockServer::start().await;
    mount_slow_expired_endpoint(&mock_server, "/appointments/").await;
    mount_slow_expired_endpoint(&mock_server, "/medical-records/").await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);

    let (a, b) = futures::future::join(
        client.get("/appointments/"),
        client.get("/medical-records/"),
    )
    .await;

    assert_eq!(a.unwrap().status(), 200);
    assert_eq!(b.unwrap().status(), 200);

    // Two originals, two retries: one retry each
    let received = mock_server.received_requests().await.unwrap();
    let count = |route: &str| {
        received
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    };
    assert_eq!(count("/appointments/"), 2);
    assert_eq!(count("/medical-records/"), 2);
    assert_eq!(count(REFRESH_PATH), 2);
}

#[tokio::test]
async fn test_single_flight_coalesces_concurrent_refreshes() {
    let mock_server = MockServer::start().await;
    mount_slow_expired_endpoint(&mock_server, "/appointments/").await;
    mount_slow_expired_endpoint(&mock_server, "/patients/").await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_with_policy(&mock_server, &store, RefreshPolicy::SingleFlight);

    let (a, b) =
        futures::future::join(client.get("/appointments/"), client.get("/patients/")).await;

    assert_eq!(a.unwrap().status(), 200);
    assert_eq!(b.unwrap().status(), 200);
    assert_eq!(
        store.get(CredentialKey::AccessToken).await.unwrap(),
        Some("T2".to_string())
    );
}

#[tokio::test]
async fn test_concurrent_failure_does_not_affect_other_retry_budget() {
    let mock_server = MockServer::start().await;

    // Request A keeps getting 401; request B recovers after refresh
    Mock::given(method("GET"))
        .and(path("/always-denied/"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_slow_expired_endpoint(&mock_server, "/appointments/").await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);

    let (a, b) = futures::future::join(
        client.get("/always-denied/"),
        client.get("/appointments/"),
    )
    .await;

    assert_eq!(a.unwrap().status(), 401);
    assert_eq!(b.unwrap().status(), 200);
}

// ============================================================================
// Session invalidation
// ============================================================================

#[tokio::test]
async fn test_invalidate_session_clears_and_emits() {
    let mock_server = MockServer::start().await;
    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);
    let mut events = client.subscribe();

    client
        .invalidate_session(InvalidationReason::LoggedOut)
        .await
        .unwrap();

    assert_store_empty(&store).await;
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Invalidated {
            reason: InvalidationReason::LoggedOut
        }
    );
}

#[tokio::test]
async fn test_refresh_failure_reported_even_when_clear_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = UnclearableStore::default();
    store
        .set(CredentialKey::AccessToken, "T1".to_string())
        .await
        .unwrap();
    store
        .set(CredentialKey::RefreshToken, "R1".to_string())
        .await
        .unwrap();
    let config = HttpClientConfig::builder().base_url(mock_server.uri()).build();
    let client = AuthenticatedClient::new(config, Arc::new(store)).unwrap();
    let mut events = client.subscribe();

    let err = client.get("/appointments/").await.unwrap_err();

    assert!(matches!(err, Error::TokenRefresh { .. }));
    assert!(err.is_auth_failure());
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Invalidated {
            reason: InvalidationReason::RefreshFailed
        }
    );
}

#[tokio::test]
async fn test_missing_refresh_token_reported_even_when_clear_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let store = UnclearableStore::default();
    store
        .set(CredentialKey::AccessToken, "T1".to_string())
        .await
        .unwrap();
    let config = HttpClientConfig::builder().base_url(mock_server.uri()).build();
    let client = AuthenticatedClient::new(config, Arc::new(store)).unwrap();

    let err = client.get("/appointments/").await.unwrap_err();

    assert!(matches!(err, Error::ReauthRequired { .. }));
    assert!(err.is_auth_failure());
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_during_refresh_leaves_client_usable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "T2"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let store = logged_in_store("T1", "R1").await;
    let client = client_for(&mock_server, &store);
    let mut events = client.subscribe();

    // Dropped while waiting on the refresh response
    let cancelled =
        tokio::time::timeout(Duration::from_millis(150), client.get("/appointments/")).await;
    assert!(cancelled.is_err());

    assert_eq!(requests_with_bearer(&mock_server, "T2").await, 0);
    assert_eq!(
        store.credentials().await.unwrap(),
        Some(Credentials::new("T1", "R1"))
    );
    assert!(events.try_recv().is_err());

    // A fresh call runs the whole cycle to completion
    let response = client.get("/appointments/").await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(requests_with_bearer(&mock_server, "T2").await, 1);
    assert_eq!(
        store.get(CredentialKey::AccessToken).await.unwrap(),
        Some("T2".to_string())
    );
}
