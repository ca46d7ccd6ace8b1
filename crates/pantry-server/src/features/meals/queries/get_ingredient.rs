use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::MealIngredient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMealIngredientQuery {
    pub meal_id: i64,
    pub ingredient_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetMealIngredientError {
    #[error("Meal {meal_id} has no ingredient {ingredient_id}")]
    NotFound { meal_id: i64, ingredient_id: i64 },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<MealIngredient, GetMealIngredientError>> for GetMealIngredientQuery {}

impl crate::cqrs::middleware::Query for GetMealIngredientQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: GetMealIngredientQuery,
) -> Result<MealIngredient, GetMealIngredientError> {
    sqlx::query_as::<_, MealIngredient>(
        "SELECT meal_id, ingredient_id, weight FROM meal_ingredient \
         WHERE meal_id = $1 AND ingredient_id = $2",
    )
    .bind(query.meal_id)
    .bind(query.ingredient_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetMealIngredientError::NotFound {
        meal_id: query.meal_id,
        ingredient_id: query.ingredient_id,
    })
}
