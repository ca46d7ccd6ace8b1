use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::features::shared::is_positive_weight;
use crate::models::{Ingredient, IngredientDelivery};
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeliveryCommand {
    pub ingredient_id: i64,
    /// Grams delivered
    pub weight: f64,
    /// Set from the caller's identity, never from the body
    #[serde(skip)]
    pub accepted: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeliveryResponse {
    pub delivery: IngredientDelivery,
    /// Stock on hand after the delivery
    pub ingredient_weight: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDeliveryError {
    #[error("Weight must be a positive number of grams")]
    InvalidWeight,
    #[error("Ingredient {0} not found")]
    IngredientNotFound(i64),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<CreateDeliveryResponse, CreateDeliveryError>> for CreateDeliveryCommand {}

impl crate::cqrs::middleware::Command for CreateDeliveryCommand {}

impl CreateDeliveryCommand {
    pub fn validate(&self) -> Result<(), CreateDeliveryError> {
        if !is_positive_weight(self.weight) {
            return Err(CreateDeliveryError::InvalidWeight);
        }
        Ok(())
    }
}

/// Record a delivery and add it to the ingredient's stock in one transaction
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: CreateDeliveryCommand,
) -> Result<CreateDeliveryResponse, CreateDeliveryError> {
    command.validate()?;

    let mut uow = store.begin().await?;
    let mut ingredient = uow
        .find::<Ingredient>(command.ingredient_id)
        .await?
        .ok_or(CreateDeliveryError::IngredientNotFound(command.ingredient_id))?;

    let delivery = uow
        .insert(IngredientDelivery::new(
            command.ingredient_id,
            command.weight,
            command.accepted,
        ))
        .await?;

    ingredient.get_mut().weight += command.weight;
    uow.update(&mut ingredient).await?;
    uow.commit().await?;

    let ingredient_weight = ingredient.get().weight;
    tracing::debug!(
        delivery_id = delivery.get().id,
        ingredient_id = command.ingredient_id,
        ingredient_weight,
        "Delivery accepted"
    );

    Ok(CreateDeliveryResponse {
        delivery: delivery.into_inner(),
        ingredient_weight,
    })
}
