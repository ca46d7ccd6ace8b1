use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::Ingredient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIngredientQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetIngredientError {
    #[error("Ingredient {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Ingredient, GetIngredientError>> for GetIngredientQuery {}

impl crate::cqrs::middleware::Query for GetIngredientQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetIngredientQuery) -> Result<Ingredient, GetIngredientError> {
    sqlx::query_as::<_, Ingredient>(
        "SELECT id, name, weight, created_at, updated_at FROM ingredient WHERE id = $1",
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetIngredientError::NotFound(query.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestIngredient;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_returns_stock(pool: PgPool) -> sqlx::Result<()> {
        let id = TestIngredient::new("Chickpeas").with_weight(750.0).insert(&pool).await?;

        let ingredient = handle(pool, GetIngredientQuery { id }).await.unwrap();
        assert_eq!(ingredient.name, "Chickpeas");
        assert_eq!(ingredient.weight, 750.0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_missing(pool: PgPool) {
        let result = handle(pool, GetIngredientQuery { id: 404 }).await;
        assert!(matches!(result, Err(GetIngredientError::NotFound(404))));
    }
}
