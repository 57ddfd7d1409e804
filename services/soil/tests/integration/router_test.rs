use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum_test::TestServer;
use chrono::Duration as ChronoDuration;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use soilscan_auth_types::token::{TokenKind, TokenSubject};
use soilscan_soil::domain::types::UploadPolicy;
use soilscan_soil::infra::inference::{ClassMapping, HttpInferenceEngine};
use soilscan_soil::infra::mailer::{LogEmailNotifier, Mailer};
use soilscan_soil::infra::storage::FsImageStore;
use soilscan_soil::router::build_router;
use soilscan_soil::state::AppState;
use soilscan_testing::auth::{MockAuth, test_token_service};
use soilscan_testing::fixture::ScratchDir;

use crate::helpers::fast_hashing;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Router over a disconnected database and an unreachable Redis. Only paths that
/// reject before touching either are exercised here.
fn server(dir: &ScratchDir) -> TestServer {
    let redis = deadpool_redis::Config::from_url("redis://127.0.0.1:1")
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let mapping = ClassMapping::from_json(include_str!("../../assets/class_mapping.json")).unwrap();
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        redis,
        tokens: test_token_service(),
        hashing: fast_hashing(),
        images: FsImageStore::new(dir.path()),
        engine: HttpInferenceEngine::new(
            "http://127.0.0.1:1/predict".to_owned(),
            mapping,
            Duration::from_secs(1),
        )
        .unwrap(),
        mailer: Mailer::Log(LogEmailNotifier),
        upload_policy: UploadPolicy::default(),
        inference_timeout: Duration::from_secs(1),
        notify_timeout: Duration::from_secs(1),
        cookie_secure: false,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

#[tokio::test]
async fn should_answer_liveness_with_request_id() {
    let dir = ScratchDir::new();
    let response = server(&dir).get("/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.headers().contains_key(&REQUEST_ID));
}

#[tokio::test]
async fn should_echo_incoming_request_id() {
    let dir = ScratchDir::new();
    let response = server(&dir)
        .get("/healthz")
        .add_header(REQUEST_ID, HeaderValue::from_static("trace-me-42"))
        .await;

    assert_eq!(
        response.headers().get(&REQUEST_ID).and_then(|v| v.to_str().ok()),
        Some("trace-me-42")
    );
}

// ── Protected routes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_history_without_credentials() {
    let dir = ScratchDir::new();
    let response = server(&dir).get("/api/v1/soil/history").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "MALFORMED_CREDENTIAL");
}

#[tokio::test]
async fn should_reject_expired_bearer() {
    let dir = ScratchDir::new();
    let auth = MockAuth::new(test_token_service(), "farmer@example.com", Uuid::now_v7());
    let response = server(&dir)
        .get("/api/v1/soil/stats")
        .add_header(header::AUTHORIZATION, bearer(&auth.expired_token(TokenKind::Access)))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "EXPIRED_TOKEN");
}

#[tokio::test]
async fn should_reject_refresh_token_on_protected_route() {
    let dir = ScratchDir::new();
    let auth = MockAuth::new(test_token_service(), "farmer@example.com", Uuid::now_v7());
    let token = auth.token(TokenKind::Refresh, ChronoDuration::days(1));
    let response = server(&dir)
        .delete(&format!("/api/v1/soil/analysis/{}", Uuid::new_v4()))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "WRONG_TOKEN_TYPE");
}

#[tokio::test]
async fn should_reject_garbage_bearer() {
    let dir = ScratchDir::new();
    let response = server(&dir)
        .get("/api/v1/soil/image/00000000-0000-0000-0000-000000000000")
        .add_header(header::AUTHORIZATION, bearer("abc.def.ghi"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "MALFORMED_TOKEN");
}

// ── Refresh ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refresh_from_cookie() {
    let dir = ScratchDir::new();
    let tokens = test_token_service();
    let subject = TokenSubject {
        email: "farmer@example.com".to_owned(),
        user_id: Uuid::now_v7(),
    };
    let refresh = tokens.issue_refresh(&subject).unwrap();

    let response = server(&dir)
        .post("/api/v1/users/refresh")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("refresh_token={}", refresh.token)).unwrap(),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["token_type"], "bearer");
    let claims = tokens
        .decode(body["access_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.kind, TokenKind::Access);
    assert_eq!(claims.user_id, subject.user_id);
}

#[tokio::test]
async fn should_reject_refresh_without_cookie() {
    let dir = ScratchDir::new();
    let response = server(&dir).post("/api/v1/users/refresh").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_REFRESH_TOKEN");
}

// ── Input validation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_non_json_register_body() {
    let dir = ScratchDir::new();
    let response = server(&dir)
        .post("/api/v1/users/register")
        .text("username=farmer")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_INPUT");
}

#[tokio::test]
async fn should_reject_register_with_invalid_email() {
    let dir = ScratchDir::new();
    let response = server(&dir)
        .post("/api/v1/users/register")
        .json(&json!({
            "username": "farmer",
            "email": "not-an-email",
            "password": "correct horse battery staple",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_INPUT");
}
