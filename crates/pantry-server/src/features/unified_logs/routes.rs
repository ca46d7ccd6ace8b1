//! Unified log API routes
//!
//! - `GET /api/v1/unified-logs` - Login events, request actions and entity
//!   changes in one paginated, newest-first view (admin only)

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

use super::queries::{UnifiedLogsError, UnifiedLogsQuery};

pub fn unified_logs_routes() -> Router<PgPool> {
    Router::new().route("/", get(unified_logs))
}

#[tracing::instrument(skip(pool, admin), fields(user_id = admin.user_id))]
async fn unified_logs(
    State(pool): State<PgPool>,
    AdminUser(admin): AdminUser,
    ValidatedQuery(query): ValidatedQuery<UnifiedLogsQuery>,
) -> Result<Response, UnifiedLogsError> {
    let response = super::queries::list::handle(pool, query).await?;
    if response.partial {
        tracing::warn!(failed = ?response.failed_sources, "Serving partial unified logs");
    }
    Ok((StatusCode::OK, Json(response)).into_response())
}

impl IntoResponse for UnifiedLogsError {
    fn into_response(self) -> Response {
        ErrorResponse::new("VALIDATION_ERROR", self.to_string())
            .into_response_with(StatusCode::BAD_REQUEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{insert_change_record, NewChangeRecord, Operation, TrackedTable};
    use crate::features::shared::test_helpers::insert_user;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header("x-user-id", "1")
            .header("x-user-role", "admin")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn seed(pool: &PgPool) -> sqlx::Result<i64> {
        let user = insert_user(pool, "ali", "cook").await?;
        let now = Utc::now();
        for minutes_ago in [50, 30, 10] {
            sqlx::query("INSERT INTO login_info (user_id, username, login_at) VALUES ($1, 'ali', $2)")
                .bind(user)
                .bind(now - Duration::minutes(minutes_ago))
                .execute(pool)
                .await?;
        }
        for minutes_ago in [40, 20] {
            let record = NewChangeRecord {
                table_name: TrackedTable::Ingredient,
                operation: Operation::Create,
                before_data: None,
                after_data: None,
                actor_id: Some(user),
                created_at: now - Duration::minutes(minutes_ago),
            };
            insert_change_record(pool, &record)
                .await
                .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        }
        Ok(user)
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_merged_first_page(pool: PgPool) -> sqlx::Result<()> {
        seed(&pool).await?;
        let app = unified_logs_routes().with_state(pool);

        let (status, body) = get_json(app, "/?limit=3&page=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 5);
        assert_eq!(body["partial"], false);

        let types: Vec<_> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["log_type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(types, ["login_info", "change_log", "login_info"]);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_filters_by_log_type_and_user(pool: PgPool) -> sqlx::Result<()> {
        let user = seed(&pool).await?;
        let app = unified_logs_routes().with_state(pool);

        let (_, body) = get_json(app.clone(), "/?log_type=change_log").await;
        assert_eq!(body["total_count"], 2);

        let (_, body) = get_json(app, &format!("/?user_id={}", user + 100)).await;
        assert_eq!(body["total_count"], 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_invalid_log_type_is_rejected(pool: PgPool) {
        let app = unified_logs_routes().with_state(pool);
        let (status, body) = get_json(app, "/?log_type=sessions").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_non_numeric_parameters_are_rejected(pool: PgPool) {
        for uri in ["/?page=first", "/?limit=ten", "/?user_id=ali"] {
            let app = unified_logs_routes().with_state(pool.clone());
            let (status, body) = get_json(app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_failed_source_yields_partial_result(pool: PgPool) -> sqlx::Result<()> {
        seed(&pool).await?;
        sqlx::query("DROP TABLE login_info").execute(&pool).await?;
        let app = unified_logs_routes().with_state(pool);

        let (status, body) = get_json(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["partial"], true);
        assert_eq!(body["failed_sources"], serde_json::json!(["login_info"]));
        assert_eq!(body["total_count"], 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_requires_admin(pool: PgPool) {
        let app = unified_logs_routes().with_state(pool);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
