use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::models::{Ingredient, Meal, MealIngredient, MealServing};
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeMealCommand {
    pub meal_id: i64,
    /// Set from the caller's identity, never from the body
    #[serde(skip)]
    pub served_by: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeMealResponse {
    pub serving: MealServing,
    /// Ingredients whose stock was drawn down, with the stock left
    pub consumed: Vec<ConsumedIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumedIngredient {
    pub ingredient_id: i64,
    pub name: String,
    pub weight: f64,
    pub remaining: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeMealError {
    #[error("Meal {0} not found")]
    MealNotFound(i64),
    #[error("Not enough stock for: {}", .0.join(", "))]
    InsufficientStock(Vec<String>),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<ServeMealResponse, ServeMealError>> for ServeMealCommand {}

impl crate::cqrs::middleware::Command for ServeMealCommand {}

/// Serve one portion of a meal
///
/// The meal and its ingredients are locked (ingredients in id order) and every
/// recipe line is checked against stock before anything is written, so a
/// refused serving leaves no trace. Otherwise each ingredient is drawn down by
/// its recipe weight and the serving is recorded, all in one transaction.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: ServeMealCommand,
) -> Result<ServeMealResponse, ServeMealError> {
    let mut uow = store.begin().await?;

    uow.find::<Meal>(command.meal_id)
        .await?
        .ok_or(ServeMealError::MealNotFound(command.meal_id))?;

    let lines = MealIngredient::for_meal(uow.conn(), command.meal_id)
        .await
        .map_err(ServerError::from)?;

    let mut stock = Vec::with_capacity(lines.len());
    let mut missing = Vec::new();
    for line in &lines {
        // removed together with its recipe lines since they were read
        let Some(ingredient) = uow.find::<Ingredient>(line.ingredient_id).await? else {
            continue;
        };
        if ingredient.get().weight < line.weight {
            missing.push(ingredient.get().name.clone());
        }
        stock.push((ingredient, line.weight));
    }

    if !missing.is_empty() {
        tracing::debug!(meal_id = command.meal_id, ?missing, "Serving refused");
        return Err(ServeMealError::InsufficientStock(missing));
    }

    let mut consumed = Vec::with_capacity(stock.len());
    for (mut ingredient, weight) in stock {
        ingredient.get_mut().weight -= weight;
        uow.update(&mut ingredient).await?;

        let ingredient = ingredient.into_inner();
        consumed.push(ConsumedIngredient {
            ingredient_id: ingredient.id,
            name: ingredient.name,
            weight,
            remaining: ingredient.weight,
        });
    }

    let serving = uow
        .insert(MealServing::new(command.meal_id, command.served_by))
        .await?;
    uow.commit().await?;

    Ok(ServeMealResponse {
        serving: serving.into_inner(),
        consumed,
    })
}
