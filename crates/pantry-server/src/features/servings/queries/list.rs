use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::PaginationParams;
use crate::models::MealServing;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListServingsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListServingsResponse {
    pub total_count: i64,
    pub items: Vec<MealServing>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListServingsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListServingsResponse, ListServingsError>> for ListServingsQuery {}

impl crate::cqrs::middleware::Query for ListServingsQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListServingsQuery,
) -> Result<ListServingsResponse, ListServingsError> {
    let pagination = PaginationParams::new(query.page, query.limit);
    pagination
        .validate()
        .map_err(ListServingsError::InvalidPagination)?;

    let total_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM meal_serving WHERE ($1::BIGINT IS NULL OR meal_id = $1)",
    )
    .bind(query.meal_id)
    .fetch_one(&pool)
    .await?;

    let items = sqlx::query_as::<_, MealServing>(
        r#"
        SELECT id, meal_id, served_by, created_at, updated_at
        FROM meal_serving
        WHERE ($1::BIGINT IS NULL OR meal_id = $1)
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.meal_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(ListServingsResponse { total_count, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestMeal;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_list_filters_by_meal(pool: PgPool) -> sqlx::Result<()> {
        let plov = TestMeal::new("Plov").insert(&pool).await?;
        let somsa = TestMeal::new("Somsa").insert(&pool).await?;
        for meal_id in [plov, plov, somsa] {
            sqlx::query("INSERT INTO meal_serving (meal_id, served_by) VALUES ($1, 1)")
                .bind(meal_id)
                .execute(&pool)
                .await?;
        }

        let query = ListServingsQuery {
            meal_id: Some(plov),
            ..Default::default()
        };
        let response = handle(pool, query).await.unwrap();
        assert_eq!(response.total_count, 2);
        assert!(response.items.iter().all(|s| s.meal_id == plov));
        Ok(())
    }
}
