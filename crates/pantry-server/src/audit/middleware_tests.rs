use super::actor::get_actor;
use super::middleware::*;
use super::models::ActionLogEntry;
use crate::middleware::auth::{AuthenticatedUser, UserRole};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use tower::ServiceExt;

async fn whoami_handler() -> impl IntoResponse {
    Json(json!({ "actor": get_actor() }))
}

async fn failing_handler() -> impl IntoResponse {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": "bad" })))
}

fn create_test_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/v1/whoami", get(whoami_handler))
        .route("/api/v1/ingredients", post(failing_handler))
        .layer(AuditLayer::new(pool))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn action_logs(pool: &PgPool) -> Vec<ActionLogEntry> {
    sqlx::query_as::<_, ActionLogEntry>(
        r#"
        SELECT id, user_id, phone, email, username, role, query, method, path,
               status_code, process_time, client_host, created_at, updated_at
        FROM action_log
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_authenticated_request_is_logged(pool: PgPool) -> sqlx::Result<()> {
    let app = create_test_router(pool.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/v1/whoami?page=2&limit=5")
                .header("x-user-id", "7")
                .header("x-user-name", "malika")
                .header("x-user-email", "malika@example.com")
                .header("x-user-phone", "+998900000007")
                .header("x-user-role", "manager")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "actor": 7 }));

    let logs = action_logs(&pool).await;
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.user_id, Some(7));
    assert_eq!(log.username.as_deref(), Some("malika"));
    assert_eq!(log.role.as_deref(), Some("manager"));
    assert_eq!(log.method, "GET");
    assert_eq!(log.path, "/api/v1/whoami");
    assert_eq!(log.query, "page=2&limit=5");
    assert_eq!(log.status_code, 200);
    assert_eq!(log.client_host, UNKNOWN_CLIENT_HOST);
    assert!(log.process_time >= 0.0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_anonymous_request_is_not_logged(pool: PgPool) -> sqlx::Result<()> {
    let app = create_test_router(pool.clone());

    let response = app
        .oneshot(Request::builder().uri("/api/v1/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!({ "actor": null }));
    assert!(action_logs(&pool).await.is_empty());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_error_status_is_recorded(pool: PgPool) -> sqlx::Result<()> {
    let app = create_test_router(pool.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/ingredients")
                .header("x-user-id", "3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let logs = action_logs(&pool).await;
    assert_eq!(logs[0].status_code, 422);
    assert_eq!(logs[0].method, "POST");
    assert_eq!(logs[0].query, "");
    assert_eq!(logs[0].role, None);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_extension_identity_and_peer_address(pool: PgPool) -> sqlx::Result<()> {
    let app = create_test_router(pool.clone());

    let mut request = Request::builder()
        .uri("/api/v1/whoami")
        .header("x-user-id", "99")
        .body(Body::empty())
        .unwrap();
    request.extensions_mut().insert(AuthenticatedUser {
        user_id: 4,
        username: Some("admin".to_string()),
        email: None,
        phone: None,
        role: Some(UserRole::Admin),
    });
    request
        .extensions_mut()
        .insert(ConnectInfo("10.1.2.3:5555".parse::<SocketAddr>().unwrap()));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!({ "actor": 4 }));

    let logs = action_logs(&pool).await;
    assert_eq!(logs[0].user_id, Some(4));
    assert_eq!(logs[0].role.as_deref(), Some("admin"));
    assert_eq!(logs[0].client_host, "10.1.2.3");

    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests_see_their_own_actor() {
    // Action log writes fail against this pool; responses must be unaffected.
    let pool = sqlx::postgres::PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(50))
        .connect_lazy("postgres://localhost:1/unused")
        .unwrap();
    let app = create_test_router(pool);

    let requests = (1..=20).map(|id| {
        let app = app.clone();
        async move {
            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/api/v1/whoami")
                        .header("x-user-id", id.to_string())
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            (id, body_json(response).await)
        }
    });

    for (id, body) in futures::future::join_all(requests).await {
        assert_eq!(body, json!({ "actor": id }));
    }
}
