use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::features::shared::{is_unique_violation, validate_name, NameValidationError, MAX_NAME_LENGTH};
use crate::models::Ingredient;
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateIngredientCommand {
    /// Taken from the path
    #[serde(default, skip_serializing)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stock on hand in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateIngredientError {
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,
    #[error(transparent)]
    InvalidName(#[from] NameValidationError),
    #[error("Weight must be a non-negative number")]
    InvalidWeight,
    #[error("Ingredient {0} not found")]
    NotFound(i64),
    #[error("Ingredient '{0}' already exists")]
    DuplicateName(String),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<Ingredient, UpdateIngredientError>> for UpdateIngredientCommand {}

impl crate::cqrs::middleware::Command for UpdateIngredientCommand {}

impl UpdateIngredientCommand {
    pub fn validate(&self) -> Result<(), UpdateIngredientError> {
        if self.name.is_none() && self.weight.is_none() {
            return Err(UpdateIngredientError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, MAX_NAME_LENGTH)?;
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(UpdateIngredientError::InvalidWeight);
            }
        }
        Ok(())
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: UpdateIngredientCommand,
) -> Result<Ingredient, UpdateIngredientError> {
    command.validate()?;

    let mut uow = store.begin().await?;
    let mut ingredient = uow
        .find::<Ingredient>(command.id)
        .await?
        .ok_or(UpdateIngredientError::NotFound(command.id))?;

    if let Some(name) = command.name {
        ingredient.get_mut().name = name.trim().to_string();
    }
    if let Some(weight) = command.weight {
        ingredient.get_mut().weight = weight;
    }

    let name = ingredient.get().name.clone();
    uow.update(&mut ingredient).await.map_err(|e| {
        if e.database_error().is_some_and(is_unique_violation) {
            UpdateIngredientError::DuplicateName(name)
        } else {
            UpdateIngredientError::Store(e)
        }
    })?;
    uow.commit().await?;

    Ok(ingredient.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ingredients::commands::create::{self, CreateIngredientCommand};
    use sqlx::PgPool;

    fn command(id: i64, name: Option<&str>, weight: Option<f64>) -> UpdateIngredientCommand {
        UpdateIngredientCommand {
            id,
            name: name.map(str::to_string),
            weight,
        }
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            command(1, None, None).validate(),
            Err(UpdateIngredientError::NoFieldsToUpdate)
        ));
        assert!(matches!(
            command(1, Some(" "), None).validate(),
            Err(UpdateIngredientError::InvalidName(_))
        ));
        assert!(matches!(
            command(1, None, Some(-1.0)).validate(),
            Err(UpdateIngredientError::InvalidWeight)
        ));
        assert!(matches!(
            command(1, None, Some(f64::NAN)).validate(),
            Err(UpdateIngredientError::InvalidWeight)
        ));
        assert!(command(1, None, Some(0.0)).validate().is_ok());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_updates_weight(pool: PgPool) {
        let store = EntityStore::new(pool);
        let created = create::handle(
            store.clone(),
            CreateIngredientCommand {
                name: "Onion".to_string(),
            },
        )
        .await
        .unwrap();

        let updated = handle(store, command(created.id, None, Some(750.0))).await.unwrap();
        assert_eq!(updated.weight, 750.0);
        assert_eq!(updated.name, "Onion");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_not_found(pool: PgPool) {
        let result = handle(EntityStore::new(pool), command(404, Some("Salt"), None)).await;
        assert!(matches!(result, Err(UpdateIngredientError::NotFound(404))));
    }
}
