use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::features::shared::{is_unique_violation, validate_name, NameValidationError, MAX_NAME_LENGTH};
use crate::models::Ingredient;
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIngredientCommand {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateIngredientError {
    #[error(transparent)]
    InvalidName(#[from] NameValidationError),
    #[error("Ingredient '{0}' already exists")]
    DuplicateName(String),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<Ingredient, CreateIngredientError>> for CreateIngredientCommand {}

impl crate::cqrs::middleware::Command for CreateIngredientCommand {}

impl CreateIngredientCommand {
    pub fn validate(&self) -> Result<(), CreateIngredientError> {
        validate_name(&self.name, MAX_NAME_LENGTH)?;
        Ok(())
    }
}

/// New ingredients start with no stock; deliveries add to it.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: CreateIngredientCommand,
) -> Result<Ingredient, CreateIngredientError> {
    command.validate()?;
    let name = command.name.trim().to_string();

    let mut uow = store.begin().await?;
    let ingredient = uow
        .insert(Ingredient::new(name.clone()))
        .await
        .map_err(|e| {
            if e.database_error().is_some_and(is_unique_violation) {
                CreateIngredientError::DuplicateName(name)
            } else {
                CreateIngredientError::Store(e)
            }
        })?;
    uow.commit().await?;

    Ok(ingredient.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[test]
    fn test_validation() {
        let cmd = CreateIngredientCommand {
            name: "  ".to_string(),
        };
        assert!(matches!(
            cmd.validate(),
            Err(CreateIngredientError::InvalidName(NameValidationError::Required))
        ));

        let cmd = CreateIngredientCommand {
            name: "x".repeat(256),
        };
        assert!(matches!(
            cmd.validate(),
            Err(CreateIngredientError::InvalidName(NameValidationError::TooLong { .. }))
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_creates_ingredient(pool: PgPool) {
        let store = EntityStore::new(pool);
        let cmd = CreateIngredientCommand {
            name: " Carrot ".to_string(),
        };

        let ingredient = handle(store.clone(), cmd.clone()).await.unwrap();
        assert_eq!(ingredient.name, "Carrot");
        assert_eq!(ingredient.weight, 0.0);

        let result = handle(store, cmd).await;
        assert!(matches!(result, Err(CreateIngredientError::DuplicateName(name)) if name == "Carrot"));
    }
}
