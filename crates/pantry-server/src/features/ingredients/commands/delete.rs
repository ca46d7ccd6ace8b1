use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::audit::Tracked;
use crate::error::ServerError;
use crate::models::{Ingredient, MealIngredient};
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteIngredientCommand {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteIngredientResponse {
    pub id: i64,
    pub deleted: bool,
    /// Recipe lines that used the ingredient
    pub removed_lines: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteIngredientError {
    #[error("Ingredient {0} not found")]
    NotFound(i64),
    #[error("Cannot delete ingredient {0}: it has recorded deliveries")]
    HasDependencies(i64),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<DeleteIngredientResponse, DeleteIngredientError>> for DeleteIngredientCommand {}

impl crate::cqrs::middleware::Command for DeleteIngredientCommand {}

/// Deliveries block the delete. Otherwise every recipe line using the
/// ingredient is deleted through the unit of work, then the ingredient itself.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: DeleteIngredientCommand,
) -> Result<DeleteIngredientResponse, DeleteIngredientError> {
    let mut uow = store.begin().await?;
    let ingredient = uow
        .find::<Ingredient>(command.id)
        .await?
        .ok_or(DeleteIngredientError::NotFound(command.id))?;

    // the ingredient row is locked, so no delivery can be added after this check
    let delivered: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM ingredient_delivery WHERE ingredient_id = $1)",
    )
    .bind(command.id)
    .fetch_one(uow.conn())
    .await
    .map_err(ServerError::from)?;
    if delivered {
        return Err(DeleteIngredientError::HasDependencies(command.id));
    }

    let lines = MealIngredient::for_ingredient(uow.conn(), command.id)
        .await
        .map_err(ServerError::from)?;
    let mut removed_lines = 0;
    for line in lines {
        if uow.delete(Tracked::new(line)).await? {
            removed_lines += 1;
        }
    }

    let deleted = uow.delete(ingredient).await?;
    uow.commit().await?;

    Ok(DeleteIngredientResponse {
        id: command.id,
        deleted,
        removed_lines,
    })
}
