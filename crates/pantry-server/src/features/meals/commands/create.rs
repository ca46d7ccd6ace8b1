use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::features::shared::{
    is_unique_violation, validate_name, NameValidationError, MAX_NAME_LENGTH,
};
use crate::models::Meal;
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMealCommand {
    pub name: String,
    /// Set from the caller's identity, never from the body
    #[serde(skip)]
    pub added_by: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateMealError {
    #[error(transparent)]
    InvalidName(#[from] NameValidationError),
    #[error("Meal '{0}' already exists")]
    DuplicateName(String),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<Meal, CreateMealError>> for CreateMealCommand {}

impl crate::cqrs::middleware::Command for CreateMealCommand {}

impl CreateMealCommand {
    pub fn validate(&self) -> Result<(), CreateMealError> {
        validate_name(&self.name, MAX_NAME_LENGTH)?;
        Ok(())
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: EntityStore, command: CreateMealCommand) -> Result<Meal, CreateMealError> {
    command.validate()?;
    let name = command.name.trim().to_string();

    let mut uow = store.begin().await?;
    let meal = uow
        .insert(Meal::new(name.clone(), command.added_by))
        .await
        .map_err(|e| {
            if e.database_error().is_some_and(is_unique_violation) {
                CreateMealError::DuplicateName(name)
            } else {
                CreateMealError::Store(e)
            }
        })?;
    uow.commit().await?;

    Ok(meal.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[test]
    fn test_added_by_is_not_deserialized() {
        let cmd: CreateMealCommand =
            serde_json::from_str(r#"{"name": "Plov", "added_by": 99}"#).unwrap();
        assert_eq!(cmd.added_by, None);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_creates_meal(pool: PgPool) {
        let store = EntityStore::new(pool);
        let cmd = CreateMealCommand {
            name: "Plov".to_string(),
            added_by: Some(5),
        };

        let meal = handle(store.clone(), cmd.clone()).await.unwrap();
        assert_eq!(meal.name, "Plov");
        assert_eq!(meal.added_by, Some(5));

        let duplicate = handle(store, cmd).await;
        assert!(matches!(duplicate, Err(CreateMealError::DuplicateName(_))));
    }
}
