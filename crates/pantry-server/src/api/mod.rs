//! HTTP application assembly

pub mod response;

use crate::audit::AuditLayer;
use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::features;
use crate::middleware;
use crate::store::EntityStore;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    /// Store with the change interceptor registered
    pub store: EntityStore,
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        db: state.db.clone(),
        store: state.store.clone(),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state.db.clone())
        .nest("/api/v1", features::router(feature_state))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
        .layer(AuditLayer::new(state.db))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Pantry Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    db::health_check(&pool)
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;

    Ok((StatusCode::OK, Json(json!({"status": "healthy"}))))
}
