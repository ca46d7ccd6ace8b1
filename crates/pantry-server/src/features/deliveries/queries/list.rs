use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::PaginationParams;
use crate::models::IngredientDelivery;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDeliveriesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDeliveriesResponse {
    pub total_count: i64,
    pub items: Vec<IngredientDelivery>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListDeliveriesError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListDeliveriesResponse, ListDeliveriesError>> for ListDeliveriesQuery {}

impl crate::cqrs::middleware::Query for ListDeliveriesQuery {}

/// Newest deliveries first
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListDeliveriesQuery,
) -> Result<ListDeliveriesResponse, ListDeliveriesError> {
    let pagination = PaginationParams::new(query.page, query.limit);
    pagination
        .validate()
        .map_err(ListDeliveriesError::InvalidPagination)?;

    let total_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ingredient_delivery WHERE ($1::BIGINT IS NULL OR ingredient_id = $1)",
    )
    .bind(query.ingredient_id)
    .fetch_one(&pool)
    .await?;

    let items = sqlx::query_as::<_, IngredientDelivery>(
        r#"
        SELECT id, ingredient_id, weight, accepted, created_at, updated_at
        FROM ingredient_delivery
        WHERE ($1::BIGINT IS NULL OR ingredient_id = $1)
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.ingredient_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(ListDeliveriesResponse { total_count, items })
}
