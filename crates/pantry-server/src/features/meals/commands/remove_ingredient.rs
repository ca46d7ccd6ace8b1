use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::models::MealIngredient;
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveMealIngredientCommand {
    pub meal_id: i64,
    pub ingredient_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveMealIngredientError {
    #[error("Ingredient {ingredient_id} is not part of meal {meal_id}")]
    NotFound { meal_id: i64, ingredient_id: i64 },
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<MealIngredient, RemoveMealIngredientError>> for RemoveMealIngredientCommand {}

impl crate::cqrs::middleware::Command for RemoveMealIngredientCommand {}

/// Returns the removed line
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: RemoveMealIngredientCommand,
) -> Result<MealIngredient, RemoveMealIngredientError> {
    let not_found = RemoveMealIngredientError::NotFound {
        meal_id: command.meal_id,
        ingredient_id: command.ingredient_id,
    };

    let mut uow = store.begin().await?;
    let line = uow
        .find::<MealIngredient>((command.meal_id, command.ingredient_id))
        .await?
        .ok_or(not_found)?;

    let removed = line.get().clone();
    uow.delete(line).await?;
    uow.commit().await?;

    Ok(removed)
}
