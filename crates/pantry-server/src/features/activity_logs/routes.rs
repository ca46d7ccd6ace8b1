//! Activity log API routes
//!
//! - `GET /api/v1/login-info` - Login events, newest first (admin only)
//! - `GET /api/v1/logging` - Per-request action log, newest first (admin only)

use crate::api::response::ErrorResponse;
use crate::features::shared::ValidatedQuery;
use crate::middleware::auth::AdminUser;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::queries::{ActivityLogError, ListActionLogsQuery, ListLoginInfoQuery};

pub fn login_info_routes() -> Router<PgPool> {
    Router::new().route("/", get(list_login_info))
}

pub fn action_log_routes() -> Router<PgPool> {
    Router::new().route("/", get(list_action_logs))
}

#[tracing::instrument(skip(pool, admin), fields(user_id = admin.user_id))]
async fn list_login_info(
    State(pool): State<PgPool>,
    AdminUser(admin): AdminUser,
    ValidatedQuery(query): ValidatedQuery<ListLoginInfoQuery>,
) -> Result<Response, ActivityLogError> {
    let page = super::queries::login_info::handle(pool, query).await?;
    Ok((StatusCode::OK, Json(page)).into_response())
}

#[tracing::instrument(skip(pool, admin), fields(user_id = admin.user_id))]
async fn list_action_logs(
    State(pool): State<PgPool>,
    AdminUser(admin): AdminUser,
    ValidatedQuery(query): ValidatedQuery<ListActionLogsQuery>,
) -> Result<Response, ActivityLogError> {
    let page = super::queries::actions::handle(pool, query).await?;
    Ok((StatusCode::OK, Json(page)).into_response())
}

impl IntoResponse for ActivityLogError {
    fn into_response(self) -> Response {
        match self {
            ActivityLogError::InvalidPagination(message) => {
                ErrorResponse::new("VALIDATION_ERROR", message)
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            ActivityLogError::Store(e) => {
                tracing::error!("Database error in activity log API: {}", e);
                ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}
