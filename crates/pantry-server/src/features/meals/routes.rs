//! Meal API routes
//!
//! - `POST /api/v1/meals` - Create a meal
//! - `GET /api/v1/meals` - List meals (`page`, `limit`)
//! - `GET /api/v1/meals/:id` - Fetch a meal with its recipe
//! - `PUT /api/v1/meals/:id` - Rename a meal
//! - `DELETE /api/v1/meals/:id` - Delete a meal and its recipe
//! - `GET /api/v1/meals/:id/ingredients` - List recipe lines (`page`, `limit`)
//! - `GET /api/v1/meals/:id/ingredients/:ingredient_id` - Fetch one recipe line
//! - `PUT /api/v1/meals/:id/ingredients/:ingredient_id` - Set a recipe line
//! - `DELETE /api/v1/meals/:id/ingredients/:ingredient_id` - Remove a recipe line

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
        CreateMealCommand, CreateMealError, DeleteMealCommand, DeleteMealError,
        RemoveMealIngredientCommand, RemoveMealIngredientError, RenameMealCommand,
        RenameMealError, SetMealIngredientCommand, SetMealIngredientError,
    },
    queries::{
        GetMealError, GetMealIngredientError, GetMealIngredientQuery, GetMealQuery,
        ListMealIngredientsError, ListMealIngredientsQuery, ListMealsError, ListMealsQuery,
    },
};

pub fn meals_routes() -> Router<EntityStore> {
    Router::new()
        .route("/", get(list_meals).post(create_meal))
        .route("/:id", get(get_meal).put(rename_meal).delete(delete_meal))
        .route("/:id/ingredients", get(list_meal_ingredients))
        .route(
            "/:id/ingredients/:ingredient_id",
            get(get_meal_ingredient)
                .put(set_meal_ingredient)
                .delete(remove_meal_ingredient),
        )
}

#[tracing::instrument(skip(store, command), fields(user_id = user.user_id))]
async fn create_meal(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Json(mut command): Json<CreateMealCommand>,
) -> Result<Response, MealApiError> {
    command.added_by = Some(user.user_id);

    let response = super::commands::create::handle(store, command).await?;

    tracing::info!(meal_id = response.id, name = %response.name, "Meal created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store, command), fields(user_id = user.user_id))]
async fn rename_meal(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(mut command): Json<RenameMealCommand>,
) -> Result<Response, MealApiError> {
    command.id = id;

    let response = super::commands::rename::handle(store, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store), fields(user_id = user.user_id))]
async fn delete_meal(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, MealApiError> {
    let response = super::commands::delete::handle(store, DeleteMealCommand { id }).await?;

    tracing::info!(meal_id = id, removed_lines = response.removed_lines, "Meal deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store, command), fields(user_id = user.user_id))]
async fn set_meal_ingredient(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Path((meal_id, ingredient_id)): Path<(i64, i64)>,
    Json(mut command): Json<SetMealIngredientCommand>,
) -> Result<Response, MealApiError> {
    command.meal_id = meal_id;
    command.ingredient_id = ingredient_id;

    let response = super::commands::set_ingredient::handle(store, command).await?;
    let status = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store), fields(user_id = user.user_id))]
async fn remove_meal_ingredient(
    State(store): State<EntityStore>,
    CurrentUser(user): CurrentUser,
    Path((meal_id, ingredient_id)): Path<(i64, i64)>,
) -> Result<Response, MealApiError> {
    let command = RemoveMealIngredientCommand {
        meal_id,
        ingredient_id,
    };
    let response = super::commands::remove_ingredient::handle(store, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store))]
async fn list_meals(
    State(store): State<EntityStore>,
    ValidatedQuery(query): ValidatedQuery<ListMealsQuery>,
) -> Result<Response, MealApiError> {
    let response = super::queries::list::handle(store.pool().clone(), query).await?;

    tracing::debug!(count = response.items.len(), total = response.total_count, "Meals listed via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store))]
async fn get_meal(
    State(store): State<EntityStore>,
    Path(id): Path<i64>,
) -> Result<Response, MealApiError> {
    let details = super::queries::get::handle(store.pool().clone(), GetMealQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(details))).into_response())
}

#[tracing::instrument(skip(store))]
async fn list_meal_ingredients(
    State(store): State<EntityStore>,
    Path(meal_id): Path<i64>,
    ValidatedQuery(mut query): ValidatedQuery<ListMealIngredientsQuery>,
) -> Result<Response, MealApiError> {
    query.meal_id = meal_id;

    let response = super::queries::list_ingredients::handle(store.pool().clone(), query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(store))]
async fn get_meal_ingredient(
    State(store): State<EntityStore>,
    Path((meal_id, ingredient_id)): Path<(i64, i64)>,
) -> Result<Response, MealApiError> {
    let query = GetMealIngredientQuery {
        meal_id,
        ingredient_id,
    };
    let line = super::queries::get_ingredient::handle(store.pool().clone(), query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(line))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum MealApiError {
    #[error(transparent)]
    Create(#[from] CreateMealError),
    #[error(transparent)]
    Rename(#[from] RenameMealError),
    #[error(transparent)]
    Delete(#[from] DeleteMealError),
    #[error(transparent)]
    SetIngredient(#[from] SetMealIngredientError),
    #[error(transparent)]
    RemoveIngredient(#[from] RemoveMealIngredientError),
    #[error(transparent)]
    List(#[from] ListMealsError),
    #[error(transparent)]
    Get(#[from] GetMealError),
    #[error(transparent)]
    ListIngredients(#[from] ListMealIngredientsError),
    #[error(transparent)]
    GetIngredient(#[from] GetMealIngredientError),
}

impl IntoResponse for MealApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match self {
            MealApiError::Create(CreateMealError::InvalidName(_))
            | MealApiError::Rename(RenameMealError::InvalidName(_))
            | MealApiError::SetIngredient(SetMealIngredientError::InvalidWeight)
            | MealApiError::List(ListMealsError::InvalidPagination(_))
            | MealApiError::ListIngredients(ListMealIngredientsError::InvalidPagination(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },
            MealApiError::Rename(RenameMealError::NotFound(_))
            | MealApiError::Delete(DeleteMealError::NotFound(_))
            | MealApiError::SetIngredient(SetMealIngredientError::NotFound { .. })
            | MealApiError::RemoveIngredient(RemoveMealIngredientError::NotFound { .. })
            | MealApiError::Get(GetMealError::NotFound(_))
            | MealApiError::ListIngredients(ListMealIngredientsError::MealNotFound(_))
            | MealApiError::GetIngredient(GetMealIngredientError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },
            MealApiError::Create(CreateMealError::DuplicateName(_))
            | MealApiError::Rename(RenameMealError::DuplicateName(_))
            | MealApiError::Delete(DeleteMealError::HasServings(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            },
            MealApiError::Create(CreateMealError::Store(_))
            | MealApiError::Rename(RenameMealError::Store(_))
            | MealApiError::Delete(DeleteMealError::Store(_))
            | MealApiError::SetIngredient(SetMealIngredientError::Store(_))
            | MealApiError::RemoveIngredient(RemoveMealIngredientError::Store(_))
            | MealApiError::List(ListMealsError::Database(_))
            | MealApiError::Get(GetMealError::Database(_))
            | MealApiError::ListIngredients(ListMealIngredientsError::Database(_))
            | MealApiError::GetIngredient(GetMealIngredientError::Database(_)) => {
                tracing::error!("Database error in meal API: {}", message);
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

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_meal_records_added_by(pool: PgPool) -> sqlx::Result<()> {
        let app = meals_routes().with_state(EntityStore::new(pool.clone()));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .header("x-user-id", "31")
            .body(Body::from(r#"{"name":"Manti","added_by":1}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let added_by: Option<i64> = sqlx::query_scalar("SELECT added_by FROM meal WHERE name = 'Manti'")
            .fetch_one(&pool)
            .await?;
        assert_eq!(added_by, Some(31));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_set_ingredient_unknown_pair(pool: PgPool) {
        let app = meals_routes().with_state(EntityStore::new(pool));
        let request = Request::builder()
            .method("PUT")
            .uri("/5/ingredients/6")
            .header("content-type", "application/json")
            .header("x-user-id", "1")
            .body(Body::from(r#"{"weight":12.5}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_read_meal_and_recipe(pool: PgPool) -> sqlx::Result<()> {
        use crate::features::shared::test_helpers::{TestIngredient, TestMeal};

        let lamb = TestIngredient::new("Lamb").insert(&pool).await?;
        let meal_id = TestMeal::new("Shurpa").with_line(lamb, 180.0).insert(&pool).await?;
        let app = meals_routes().with_state(EntityStore::new(pool));

        for (uri, status) in [
            ("/".to_string(), StatusCode::OK),
            (format!("/{meal_id}"), StatusCode::OK),
            (format!("/{meal_id}/ingredients"), StatusCode::OK),
            (format!("/{meal_id}/ingredients/{lamb}"), StatusCode::OK),
            (format!("/{}", meal_id + 1), StatusCode::NOT_FOUND),
            (format!("/{}/ingredients", meal_id + 1), StatusCode::NOT_FOUND),
            (format!("/{meal_id}/ingredients/{}", lamb + 1), StatusCode::NOT_FOUND),
            (format!("/{meal_id}/ingredients?page=0"), StatusCode::BAD_REQUEST),
        ] {
            let request = Request::builder().uri(&uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), status, "{uri}");
        }

        let request = Request::builder().uri(format!("/{meal_id}")).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["name"], "Shurpa");
        assert_eq!(json["data"]["ingredients"][0]["weight"], 180.0);
        Ok(())
    }
}
