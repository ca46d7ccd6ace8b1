use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::PaginationParams;
use crate::models::MealIngredient;

/// Recipe lines of one meal; `meal_id` comes from the path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMealIngredientsQuery {
    #[serde(default)]
    pub meal_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMealIngredientsResponse {
    pub total_count: i64,
    pub items: Vec<MealIngredient>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListMealIngredientsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Meal {0} not found")]
    MealNotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListMealIngredientsResponse, ListMealIngredientsError>>
    for ListMealIngredientsQuery
{
}

impl crate::cqrs::middleware::Query for ListMealIngredientsQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListMealIngredientsQuery,
) -> Result<ListMealIngredientsResponse, ListMealIngredientsError> {
    let pagination = PaginationParams::new(query.page, query.limit);
    pagination
        .validate()
        .map_err(ListMealIngredientsError::InvalidPagination)?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM meal WHERE id = $1)")
        .bind(query.meal_id)
        .fetch_one(&pool)
        .await?;
    if !exists {
        return Err(ListMealIngredientsError::MealNotFound(query.meal_id));
    }

    let total_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM meal_ingredient WHERE meal_id = $1")
            .bind(query.meal_id)
            .fetch_one(&pool)
            .await?;

    let items = sqlx::query_as::<_, MealIngredient>(
        r#"
        SELECT meal_id, ingredient_id, weight
        FROM meal_ingredient
        WHERE meal_id = $1
        ORDER BY ingredient_id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.meal_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(ListMealIngredientsResponse { total_count, items })
}
