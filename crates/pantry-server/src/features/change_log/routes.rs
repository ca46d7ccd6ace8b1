//! Change log API routes
//!
//! - `GET /api/v1/change-log` - Raw change records, newest first (admin only)

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

use super::queries::{ListChangeLogError, ListChangeLogQuery};

pub fn change_log_routes() -> Router<PgPool> {
    Router::new().route("/", get(list_change_log))
}

#[tracing::instrument(skip(pool, admin), fields(user_id = admin.user_id))]
async fn list_change_log(
    State(pool): State<PgPool>,
    AdminUser(admin): AdminUser,
    ValidatedQuery(query): ValidatedQuery<ListChangeLogQuery>,
) -> Result<Response, ListChangeLogError> {
    let page = super::queries::list::handle(pool, query).await?;
    Ok((StatusCode::OK, Json(page)).into_response())
}

impl IntoResponse for ListChangeLogError {
    fn into_response(self) -> Response {
        match self {
            ListChangeLogError::InvalidPagination(message) => {
                ErrorResponse::new("VALIDATION_ERROR", message)
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            ListChangeLogError::Store(e) => {
                tracing::error!("Database error in change log API: {}", e);
                ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn get(role: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/?limit=5").header("x-user-id", "3");
        if let Some(role) = role {
            builder = builder.header("x-user-role", role);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_admin_only(pool: PgPool) {
        let app = change_log_routes().with_state(pool);

        let response = app.clone().oneshot(get(Some("cook"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(get(Some("admin"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total_count"], 0);
    }
}
