use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::PaginationParams;
use crate::models::Meal;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMealsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMealsResponse {
    pub total_count: i64,
    pub items: Vec<Meal>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListMealsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListMealsResponse, ListMealsError>> for ListMealsQuery {}

impl crate::cqrs::middleware::Query for ListMealsQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListMealsQuery) -> Result<ListMealsResponse, ListMealsError> {
    let pagination = PaginationParams::new(query.page, query.limit);
    pagination
        .validate()
        .map_err(ListMealsError::InvalidPagination)?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meal")
        .fetch_one(&pool)
        .await?;

    let items = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, name, added_by, created_at, updated_at
        FROM meal
        ORDER BY name
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(ListMealsResponse { total_count, items })
}
