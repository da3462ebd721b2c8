//! Wire contract of the HTTP surface: envelopes, status codes and guards
//!
//! Requests that are rejected before reaching the store run everywhere.
//! Tests that pass authentication need `REDIS_URL`; the ones that touch
//! rows also need `DATABASE_URL`.

mod support;

use admin::{
    AppState,
    config::JwtConfig,
    middleware::{ACTIVE_STAFF, Claims, JwtVerifier, TokenType},
    models::Permission,
    routes::create_router,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use common::cache::{RedisConfig, RedisPool};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use uuid::Uuid;

use support::{fixture, settings};

const PRIVATE_KEY: &str = include_str!("fixtures/jwt_private.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/jwt_public.pem");

fn redis_url() -> Option<String> {
    std::env::var("REDIS_URL").ok()
}

async fn app(pool: PgPool) -> (Router, RedisPool) {
    // The client connects on first use, so an unreachable default is fine
    let url = redis_url().unwrap_or_else(|| "redis://127.0.0.1:1".to_string());
    let redis = RedisPool::new(&RedisConfig { url }).await.unwrap();
    let verifier = JwtVerifier::new(&JwtConfig {
        public_key: PUBLIC_KEY.to_string(),
    })
    .unwrap();

    let state = AppState::new(pool, redis.clone(), verifier, &settings()).unwrap();
    (create_router(state), redis)
}

/// Router over a pool that never connects
async fn offline_app() -> (Router, RedisPool) {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://admin@127.0.0.1:1/unused")
        .unwrap();
    app(pool).await
}

fn token(sub: Uuid, role: Option<&str>, permissions: &[Permission]) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = Claims {
        sub,
        role: role.map(str::to_string),
        status: role.map(|_| ACTIVE_STAFF.to_string()),
        permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
        iat: now,
        exp: now + 600,
        token_type: TokenType::Access,
    };
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

fn admin_token() -> String {
    token(Uuid::new_v4(), Some("admin"), &Permission::ALL)
}

fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_panel(body: &Value, status: StatusCode) {
    assert_eq!(body["responseCode"], json!(status.as_u16()), "body: {}", body);
    assert!(body["responseMessage"].is_string(), "body: {}", body);
    assert!(body.get("statusCode").is_none(), "body: {}", body);
}

fn assert_detail(body: &Value, status: StatusCode) {
    assert_eq!(body["statusCode"], json!(status.as_u16()), "body: {}", body);
    assert!(body["message"].is_string(), "body: {}", body);
    assert!(body.get("responseCode").is_none(), "body: {}", body);
}

#[tokio::test]
async fn test_missing_field_is_a_validation_error() {
    let (router, _) = offline_app().await;
    let (status, body) = send(
        router,
        request(Method::POST, "/users/register", None, Some(r#"{"name":"Ada"}"#)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_panel(&body, status);
    let message = body["responseMessage"].as_str().unwrap();
    assert!(message.contains("email"), "message: {}", message);
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let (router, _) = offline_app().await;
    let (status, body) = send(
        router,
        request(Method::POST, "/users/register", None, Some("{not json")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_panel(&body, status);
}

#[tokio::test]
async fn test_wrong_content_type_is_a_validation_error() {
    let (router, _) = offline_app().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users/register")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("name=Ada"))
        .unwrap();
    let (status, body) = send(router, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_panel(&body, status);
}

#[tokio::test]
async fn test_unknown_route_answers_in_envelope() {
    let (router, _) = offline_app().await;
    let (status, body) = send(router, request(Method::GET, "/nope", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_panel(&body, status);
}

#[tokio::test]
async fn test_staff_routes_require_a_token() {
    let (router, _) = offline_app().await;
    let (status, body) = send(router, request(Method::GET, "/users", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_panel(&body, status);

    let (router, _) = offline_app().await;
    let (status, body) = send(
        router,
        request(Method::GET, "/levels", Some("not-a-jwt"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_panel(&body, status);
}

#[tokio::test]
async fn test_end_users_cannot_reach_staff_routes() {
    let (router, _) = offline_app().await;
    let end_user = token(Uuid::new_v4(), None, &[]);
    let (status, body) = send(
        router,
        request(Method::GET, "/coins", Some(&end_user), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_panel(&body, status);
}

#[tokio::test]
async fn test_staff_need_the_group_permission() {
    let support_staff = token(
        Uuid::new_v4(),
        Some("support"),
        &[Permission::Users, Permission::Notifications],
    );

    for uri in ["/staff/roles", "/staff/members", "/coins", "/templates"] {
        let (router, _) = offline_app().await;
        let (status, body) = send(
            router,
            request(Method::GET, uri, Some(&support_staff), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "uri: {}", uri);
        assert_panel(&body, status);
    }
}

#[tokio::test]
async fn test_malformed_path_and_query_are_validation_errors() {
    if redis_url().is_none() {
        return;
    }
    let token = admin_token();

    let (router, _) = offline_app().await;
    let (status, body) = send(
        router,
        request(Method::GET, "/users/profile/not-a-uuid", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_detail(&body, status);

    let (router, _) = offline_app().await;
    let (status, body) = send(
        router,
        request(Method::GET, "/levels/42", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_panel(&body, status);

    let (router, _) = offline_app().await;
    let (status, body) = send(
        router,
        request(Method::GET, "/users/search?page=1", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_panel(&body, status);
    let message = body["responseMessage"].as_str().unwrap();
    assert!(message.contains("query"), "message: {}", message);

    let (router, _) = offline_app().await;
    let uri = format!("/users/{}", Uuid::new_v4());
    let (status, body) = send(
        router,
        request(Method::PATCH, &uri, Some(&token), Some("[1, 2]")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_panel(&body, status);
}

#[tokio::test]
async fn test_revoked_token_is_rejected() {
    if redis_url().is_none() {
        return;
    }
    let token = admin_token();

    let (router, redis) = offline_app().await;
    redis.revoke_token(&token, 60).await.unwrap();
    let (status, body) = send(router, request(Method::GET, "/users", Some(&token), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_panel(&body, status);
}

#[tokio::test]
async fn test_store_backed_errors_keep_their_envelopes() {
    if redis_url().is_none() {
        return;
    }
    let Some(fx) = fixture().await else { return };
    let token = admin_token();

    // Unknown profile: 404 in the detail envelope
    let (router, _) = app(fx.pool.clone()).await;
    let uri = format!("/users/profile/{}", Uuid::new_v4());
    let (status, body) = send(router, request(Method::GET, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_detail(&body, status);

    // Generic patch with an unknown column: 400 listing it
    let user = fx.user("Patched Over HTTP").await;
    let (router, _) = app(fx.pool.clone()).await;
    let uri = format!("/users/{}", user.id);
    let (status, body) = send(
        router,
        request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(r#"{"nonexistent_col":"x"}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_panel(&body, status);
    assert_eq!(body["data"]["invalidColumns"], json!(["nonexistent_col"]));

    // Level still in use: 409
    let level = fx.level("Busy over HTTP", 0, 100).await;
    assert_eq!(
        fx.users.set_level_if_exists(user.id, level.id).await.unwrap(),
        1
    );
    let (router, _) = app(fx.pool.clone()).await;
    let uri = format!("/levels/{}", level.id);
    let (status, body) = send(router, request(Method::DELETE, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_panel(&body, status);
    assert!(fx.levels.exists(level.id).await.unwrap());
}

#[tokio::test]
async fn test_profile_uses_detail_envelope() {
    if redis_url().is_none() {
        return;
    }
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Profiled").await;

    let (router, _) = app(fx.pool.clone()).await;
    let uri = format!("/users/profile/{}", user.id);
    let (status, body) = send(
        router,
        request(Method::GET, &uri, Some(&admin_token()), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_detail(&body, status);
}

#[tokio::test]
async fn test_foreign_session_cannot_be_verified() {
    if redis_url().is_none() {
        return;
    }
    let Some(fx) = fixture().await else { return };
    let owner = fx.user("Owner over HTTP").await;
    let other = fx.user("Intruder over HTTP").await;

    let session = admin::repositories::TfaRepository::new(fx.pool.clone())
        .create(
            owner.id,
            &admin::hashing::hash_secret("123456").unwrap(),
            chrono::Utc::now() + chrono::Duration::minutes(10),
        )
        .await
        .unwrap();

    let (router, _) = app(fx.pool.clone()).await;
    let body = json!({ "session_id": session.id, "code": "123456" }).to_string();
    let (status, body) = send(
        router,
        request(
            Method::POST,
            "/tfa/verify",
            Some(&token(other.id, None, &[])),
            Some(&body),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_panel(&body, status);
}
