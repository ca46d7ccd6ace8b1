//! Ingredient API routes
//!
//! - `POST /api/v1/ingredients` - Create an ingredient
//! - `GET /api/v1/ingredients` - List ingredients (`page`, `limit`)
//! - `GET /api/v1/ingredients/:id` - Fetch one ingredient
//! - `PUT /api/v1/ingredients/:id` - Rename or restock an ingredient
//! - `DELETE /api/v1/ingredients/:id` - Delete an ingredient
//!
//! Writes require an authenticated caller so that change records carry an actor.

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::ValidatedQuery;
use crate::middleware::auth::CurrentUser;
use crate::store::EntityStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::{
    commands::{
        CreateIngredientCommand, CreateIngredientError, DeleteIngredientCommand,
        DeleteIngredientError, UpdateIngredientCommand, UpdateIngredientError,
    },
    queries::{
        GetIngredientError, GetIngredientQuery, ListIngredientsError, ListIngredientsQuery,
    },
};

pub fn ingredients_routes() -> Router<EntityStore> {
    Router::new()
        .route("/", get(list_ingredients).post(create_ingredient))
        .route(
            "/:id",
            get(get_ingredient).put(update_ingredient).delete(delete_ingredient),
        )
}

#[tracing::instrument(skip(store, command), fields(user_id = user.user_id))]
async fn create_ingredient(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Json(command): Json<CreateIngredientCommand>,
) -> Result<Response, IngredientApiError> {
    let response = super::commands::create::handle(store, command).await?;

    tracing::info!(ingredient_id = response.id, name = %response.name, "Ingredient created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store, command), fields(user_id = user.user_id))]
async fn update_ingredient(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(mut command): Json<UpdateIngredientCommand>,
) -> Result<Response, IngredientApiError> {
    command.id = id;

    let response = super::commands::update::handle(store, command).await?;

    tracing::info!(ingredient_id = response.id, "Ingredient updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store), fields(user_id = user.user_id))]
async fn delete_ingredient(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, IngredientApiError> {
    let response = super::commands::delete::handle(store, DeleteIngredientCommand { id }).await?;

    tracing::info!(ingredient_id = id, "Ingredient deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store))]
async fn list_ingredients(
    State(store): State<EntityStore>,
    ValidatedQuery(query): ValidatedQuery<ListIngredientsQuery>,
) -> Result<Response, IngredientApiError> {
    let response = super::queries::list::handle(store.pool().clone(), query).await?;

    tracing::debug!(count = response.items.len(), total = response.total_count, "Ingredients listed via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store))]
async fn get_ingredient(
    State(store): State<EntityStore>,
    Path(id): Path<i64>,
) -> Result<Response, IngredientApiError> {
    let query = GetIngredientQuery { id };
    let ingredient = super::queries::get::handle(store.pool().clone(), query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(ingredient))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum IngredientApiError {
    #[error(transparent)]
    Create(#[from] CreateIngredientError),
    #[error(transparent)]
    Update(#[from] UpdateIngredientError),
    #[error(transparent)]
    Delete(#[from] DeleteIngredientError),
    #[error(transparent)]
    List(#[from] ListIngredientsError),
    #[error(transparent)]
    Get(#[from] GetIngredientError),
}

impl IntoResponse for IngredientApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match self {
            IngredientApiError::Create(CreateIngredientError::InvalidName(_))
            | IngredientApiError::Update(UpdateIngredientError::NoFieldsToUpdate)
            | IngredientApiError::Update(UpdateIngredientError::InvalidName(_))
            | IngredientApiError::Update(UpdateIngredientError::InvalidWeight)
            | IngredientApiError::List(ListIngredientsError::InvalidPagination(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },
            IngredientApiError::Update(UpdateIngredientError::NotFound(_))
            | IngredientApiError::Get(GetIngredientError::NotFound(_))
            | IngredientApiError::Delete(DeleteIngredientError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },
            IngredientApiError::Create(CreateIngredientError::DuplicateName(_))
            | IngredientApiError::Update(UpdateIngredientError::DuplicateName(_))
            | IngredientApiError::Delete(DeleteIngredientError::HasDependencies(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            },
            IngredientApiError::Create(CreateIngredientError::Store(_))
            | IngredientApiError::Update(UpdateIngredientError::Store(_))
            | IngredientApiError::Delete(DeleteIngredientError::Store(_))
            | IngredientApiError::List(ListIngredientsError::Database(_))
            | IngredientApiError::Get(GetIngredientError::Database(_)) => {
                tracing::error!("Database error in ingredient API: {}", message);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                return error.into_response_with(StatusCode::INTERNAL_SERVER_ERROR);
            },
        };

        ErrorResponse::new(code, message).into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use sqlx::PgPool;
    use tower::ServiceExt;

    fn app(pool: PgPool) -> Router {
        ingredients_routes().with_state(EntityStore::new(pool))
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_requires_identity(pool: PgPool) {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Rice"}"#))
            .unwrap();

        let response = app(pool).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_then_conflict(pool: PgPool) {
        let request = || {
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .header("x-user-id", "1")
                .body(Body::from(r#"{"name":"Rice"}"#))
                .unwrap()
        };

        let response = app(pool.clone()).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app(pool).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_list_rejects_bad_pagination(pool: PgPool) {
        let request = Request::builder().uri("/?limit=0").body(Body::empty()).unwrap();

        let response = app(pool).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_get_by_id(pool: PgPool) -> sqlx::Result<()> {
        let id = crate::features::shared::test_helpers::TestIngredient::new("Saffron")
            .with_weight(2.5)
            .insert(&pool)
            .await?;

        let request = Request::builder().uri(format!("/{id}")).body(Body::empty()).unwrap();
        let response = app(pool.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["name"], "Saffron");
        assert_eq!(json["data"]["weight"], 2.5);

        let request = Request::builder().uri("/9999").body(Body::empty()).unwrap();
        let response = app(pool).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
