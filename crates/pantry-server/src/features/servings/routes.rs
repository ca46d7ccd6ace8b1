//! Serving API routes
//!
//! - `GET /api/v1/servings` - List servings (optionally for one meal)
//! - `POST /api/v1/servings` - Serve a meal, drawing down ingredient stock

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::ValidatedQuery;
use crate::middleware::auth::CurrentUser;
use crate::store::EntityStore;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::commands::{ServeMealCommand, ServeMealError};
use super::queries::{ListServingsError, ListServingsQuery};

pub fn servings_routes() -> Router<EntityStore> {
    Router::new().route("/", get(list_servings).post(serve_meal))
}

#[tracing::instrument(skip(store))]
async fn list_servings(
    State(store): State<EntityStore>,
    ValidatedQuery(query): ValidatedQuery<ListServingsQuery>,
) -> Result<Response, ServingApiError> {
    let response = super::queries::list::handle(store.pool().clone(), query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store, command), fields(user_id = user.user_id))]
async fn serve_meal(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Json(mut command): Json<ServeMealCommand>,
) -> Result<Response, ServingApiError> {
    command.served_by = user.user_id;

    let response = super::commands::create::handle(store, command).await?;

    tracing::info!(
        serving_id = response.serving.id,
        meal_id = response.serving.meal_id,
        "Meal served via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum ServingApiError {
    #[error(transparent)]
    Serve(#[from] ServeMealError),
    #[error(transparent)]
    List(#[from] ListServingsError),
}

impl IntoResponse for ServingApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ServingApiError::Serve(ServeMealError::InsufficientStock(names)) => {
                ErrorResponse::with_details("INSUFFICIENT_STOCK", message, json!(names))
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            ServingApiError::List(ListServingsError::InvalidPagination(_)) => {
                ErrorResponse::new("VALIDATION_ERROR", message)
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            ServingApiError::Serve(ServeMealError::MealNotFound(_)) => {
                ErrorResponse::new("NOT_FOUND", message).into_response_with(StatusCode::NOT_FOUND)
            },
            ServingApiError::Serve(ServeMealError::Store(_))
            | ServingApiError::List(ListServingsError::Database(_)) => {
                tracing::error!("Database error in serving API: {}", message);
                ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}
