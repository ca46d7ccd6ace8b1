use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::IngredientDelivery;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDeliveryQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetDeliveryError {
    #[error("Delivery {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<IngredientDelivery, GetDeliveryError>> for GetDeliveryQuery {}

impl crate::cqrs::middleware::Query for GetDeliveryQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetDeliveryQuery) -> Result<IngredientDelivery, GetDeliveryError> {
    sqlx::query_as::<_, IngredientDelivery>(
        r#"
        SELECT id, ingredient_id, weight, accepted, created_at, updated_at
        FROM ingredient_delivery
        WHERE id = $1
        "#,
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetDeliveryError::NotFound(query.id))
}
