use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::models::{Ingredient, IngredientDelivery};
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDeliveryCommand {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDeliveryResponse {
    pub id: i64,
    pub deleted: bool,
    /// Stock on hand after the delivery was taken back
    pub ingredient_weight: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteDeliveryError {
    #[error("Delivery {0} not found")]
    NotFound(i64),
    #[error("Cannot delete delivery {id}: only {available}g of its {delivered}g are still in stock")]
    StockAlreadyUsed {
        id: i64,
        delivered: f64,
        available: f64,
    },
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<DeleteDeliveryResponse, DeleteDeliveryError>> for DeleteDeliveryCommand {}

impl crate::cqrs::middleware::Command for DeleteDeliveryCommand {}

/// Delete a delivery and take its weight back out of the ingredient's stock.
///
/// Locks the delivery, then the ingredient. Refused when the stock on hand
/// is already below the delivered weight.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: DeleteDeliveryCommand,
) -> Result<DeleteDeliveryResponse, DeleteDeliveryError> {
    let mut uow = store.begin().await?;
    let delivery = uow
        .find::<IngredientDelivery>(command.id)
        .await?
        .ok_or(DeleteDeliveryError::NotFound(command.id))?;

    // restricted foreign key: the ingredient outlives its deliveries
    let mut ingredient = uow
        .find::<Ingredient>(delivery.get().ingredient_id)
        .await?
        .ok_or_else(|| {
            ServerError::Internal(format!(
                "ingredient {} of delivery {} is missing",
                delivery.get().ingredient_id,
                command.id
            ))
        })?;

    let delivered = delivery.get().weight;
    let available = ingredient.get().weight;
    if available < delivered {
        return Err(DeleteDeliveryError::StockAlreadyUsed {
            id: command.id,
            delivered,
            available,
        });
    }

    let deleted = uow.delete(delivery).await?;
    ingredient.get_mut().weight -= delivered;
    uow.update(&mut ingredient).await?;
    uow.commit().await?;

    let ingredient_weight = ingredient.get().weight;
    tracing::debug!(delivery_id = command.id, ingredient_weight, "Delivery taken back");

    Ok(DeleteDeliveryResponse {
        id: command.id,
        deleted,
        ingredient_weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ChangeInterceptor, ChangeQueue, Operation, TrackedTable};
    use crate::features::shared::test_helpers::TestIngredient;
    use pantry_common::serializer::Serializer;
    use serde_json::json;
    use sqlx::PgPool;

    async fn insert_delivery(pool: &PgPool, ingredient_id: i64, weight: f64) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            "INSERT INTO ingredient_delivery (ingredient_id, weight, accepted) VALUES ($1, $2, 1) RETURNING id",
        )
        .bind(ingredient_id)
        .bind(weight)
        .fetch_one(pool)
        .await
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_takes_stock_back(pool: PgPool) -> sqlx::Result<()> {
        let flour = TestIngredient::new("Flour").with_weight(1200.0).insert(&pool).await?;
        let id = insert_delivery(&pool, flour, 1000.0).await?;
        let (queue, mut rx) = ChangeQueue::unbounded();
        let store = EntityStore::new(pool.clone())
            .with_observer(ChangeInterceptor::new(Serializer::default(), queue));

        let response = handle(store, DeleteDeliveryCommand { id }).await.unwrap();
        assert!(response.deleted);
        assert_eq!(response.ingredient_weight, 200.0);

        let removed = rx.try_recv().unwrap();
        assert_eq!(removed.table_name, TrackedTable::IngredientDelivery);
        assert_eq!(removed.operation, Operation::Delete);
        assert_eq!(removed.before_data.as_ref().unwrap()["weight"], json!(1000.0));

        let restocked = rx.try_recv().unwrap();
        assert_eq!(restocked.table_name, TrackedTable::Ingredient);
        assert_eq!(restocked.operation, Operation::Update);
        assert_eq!(restocked.before_data.as_ref().unwrap()["weight"], json!(1200.0));
        assert_eq!(restocked.after_data.as_ref().unwrap()["weight"], json!(200.0));
        assert!(rx.try_recv().is_err());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredient_delivery")
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_refuses_when_stock_was_used(pool: PgPool) -> sqlx::Result<()> {
        let milk = TestIngredient::new("Milk").with_weight(300.0).insert(&pool).await?;
        let id = insert_delivery(&pool, milk, 500.0).await?;
        let (queue, mut rx) = ChangeQueue::unbounded();
        let store = EntityStore::new(pool.clone())
            .with_observer(ChangeInterceptor::new(Serializer::default(), queue));

        let result = handle(store, DeleteDeliveryCommand { id }).await;
        assert!(matches!(
            result,
            Err(DeleteDeliveryError::StockAlreadyUsed { available, .. }) if available == 300.0
        ));
        assert!(rx.try_recv().is_err());

        let weight: f64 = sqlx::query_scalar("SELECT weight FROM ingredient WHERE id = $1")
            .bind(milk)
            .fetch_one(&pool)
            .await?;
        assert_eq!(weight, 300.0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_missing(pool: PgPool) {
        let result = handle(EntityStore::new(pool), DeleteDeliveryCommand { id: 3 }).await;
        assert!(matches!(result, Err(DeleteDeliveryError::NotFound(3))));
    }
}
