use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::PaginationParams;
use crate::models::Ingredient;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListIngredientsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListIngredientsResponse {
    pub total_count: i64,
    pub items: Vec<Ingredient>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListIngredientsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListIngredientsResponse, ListIngredientsError>> for ListIngredientsQuery {}

impl crate::cqrs::middleware::Query for ListIngredientsQuery {}

impl ListIngredientsQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListIngredientsQuery,
) -> Result<ListIngredientsResponse, ListIngredientsError> {
    let pagination = query.pagination();
    pagination
        .validate()
        .map_err(ListIngredientsError::InvalidPagination)?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredient")
        .fetch_one(&pool)
        .await?;

    let items = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, weight, created_at, updated_at
        FROM ingredient
        ORDER BY name
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(ListIngredientsResponse { total_count, items })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_pages_by_name(pool: PgPool) {
        for name in ["Beef", "Apple", "Carrot"] {
            sqlx::query("INSERT INTO ingredient (name, weight) VALUES ($1, 0)")
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }

        let page = handle(
            pool.clone(),
            ListIngredientsQuery {
                page: Some(2),
                limit: Some(2),
            },
        )
        .await
        .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Carrot");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_rejects_bad_limit(pool: PgPool) {
        let result = handle(
            pool,
            ListIngredientsQuery {
                page: None,
                limit: Some(500),
            },
        )
        .await;
        assert!(matches!(result, Err(ListIngredientsError::InvalidPagination(_))));
    }
}
