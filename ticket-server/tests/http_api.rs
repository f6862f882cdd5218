//! HTTP 层测试 - 路由、认证门禁、公共入口
//!
//! 直接对组装好的 Router 发起请求（不开真实端口）。

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::{id_string, memory_db, seed_event};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use ticket_server::api;
use ticket_server::auth::{self, JwtConfig, JwtService};
use ticket_server::core::{Config, ServerState};
use ticket_server::notify::{NoopNotifier, Notifier};
use ticket_server::orders::{LifecyclePolicy, OrderLifecycle, RedemptionService};
use ticket_server::utils::time::now_millis;

const ADMIN_PASSWORD: &str = "letmein-123";

fn test_config() -> Config {
    Config {
        work_dir: "./unused".to_string(),
        http_port: 0,
        environment: "test".to_string(),
        log_level: "info".to_string(),
        jwt: JwtConfig {
            secret: "an-integration-test-secret-of-decent-length".to_string(),
            expiration_minutes: 60,
            issuer: "ticket-server".to_string(),
        },
        admin_username: "admin".to_string(),
        admin_password_hash: Some(auth::hash_password(ADMIN_PASSWORD).unwrap()),
        smtp: None,
        notify_timeout_ms: 1_000,
        payment_recipient: "Box Office".to_string(),
        archive_run_at: "00:00".to_string(),
        enforce_total_consistency: false,
    }
}

fn build_state(db: Surreal<Db>) -> ServerState {
    let config = test_config();
    let notifier: Arc<dyn Notifier> = Arc::new(NoopNotifier);
    ServerState {
        jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        lifecycle: Arc::new(OrderLifecycle::new(
            db.clone(),
            notifier.clone(),
            LifecyclePolicy::default(),
        )),
        redemption: Arc::new(RedemptionService::new(db.clone())),
        notifier,
        db,
        config,
    }
}

async fn app() -> (Router, Surreal<Db>) {
    let db = memory_db().await;
    (api::router(build_state(db.clone())), db)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({"username": "admin", "password": ADMIN_PASSWORD}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _db) = app().await;
    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn admin_routes_reject_missing_or_bad_tokens() {
    let (app, _db) = app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/orders", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/orders", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let (app, _db) = app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({"username": "admin", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_flow_over_http() {
    let (app, db) = app().await;
    let event = seed_event(&db, now_millis() + 86_400_000).await;
    let token = login(&app).await;

    // Public checkout
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({
                "event_id": id_string(&event),
                "customer_name": "Aline M.",
                "customer_phone": "+243900000001",
                "tickets": [{"type": "Standard", "quantity": 2, "price": 10000.0}],
                "total_amount": 20000.0,
                "payment_method": "mpesa"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["order"]["payment_status"], "pending");
    assert_eq!(body["payment_instructions"]["ussd"], "*150#");
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    // Validation requires the administrator
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/orders/{order_id}/validate"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/orders/{order_id}/validate"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let redemption_token = body["order"]["token"].as_str().unwrap().to_string();

    // Re-validation is a 400-class failure
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/orders/{order_id}/validate"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Public redemption, no credentials
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders/verify-token",
            serde_json::json!({"token": redemption_token}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["token_used"], true);
    assert_eq!(body["event"]["title"], "Acoustic Night");

    // Second redemption fails
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders/verify-token",
            serde_json::json!({"token": redemption_token}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown token is a 404
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders/verify-token",
            serde_json::json!({"token": "TK-000000-DEADBEEF"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Admin listing filtered by status
    let response = app
        .clone()
        .oneshot(get_request("/api/orders?status=validated", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
