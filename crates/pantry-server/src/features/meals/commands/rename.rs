use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::features::shared::{
    is_unique_violation, validate_name, NameValidationError, MAX_NAME_LENGTH,
};
use crate::models::Meal;
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameMealCommand {
    /// Taken from the path
    #[serde(default, skip_serializing)]
    pub id: i64,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenameMealError {
    #[error(transparent)]
    InvalidName(#[from] NameValidationError),
    #[error("Meal {0} not found")]
    NotFound(i64),
    #[error("Meal '{0}' already exists")]
    DuplicateName(String),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<Meal, RenameMealError>> for RenameMealCommand {}

impl crate::cqrs::middleware::Command for RenameMealCommand {}

impl RenameMealCommand {
    pub fn validate(&self) -> Result<(), RenameMealError> {
        validate_name(&self.name, MAX_NAME_LENGTH)?;
        Ok(())
    }
}

/// Renaming to the current name succeeds without writing anything.
#[tracing::instrument(skip(store))]
pub async fn handle(store: EntityStore, command: RenameMealCommand) -> Result<Meal, RenameMealError> {
    command.validate()?;
    let name = command.name.trim().to_string();

    let mut uow = store.begin().await?;
    let mut meal = uow
        .find::<Meal>(command.id)
        .await?
        .ok_or(RenameMealError::NotFound(command.id))?;

    meal.get_mut().name = name.clone();
    uow.update(&mut meal).await.map_err(|e| {
        if e.database_error().is_some_and(is_unique_violation) {
            RenameMealError::DuplicateName(name)
        } else {
            RenameMealError::Store(e)
        }
    })?;
    uow.commit().await?;

    Ok(meal.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ChangeInterceptor, ChangeQueue, Operation};
    use crate::features::shared::test_helpers::TestMeal;
    use pantry_common::serializer::Serializer;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_emits_name_diff(pool: PgPool) -> sqlx::Result<()> {
        let id = TestMeal::new("Shurpa").insert(&pool).await?;
        let (queue, mut rx) = ChangeQueue::unbounded();
        let store = EntityStore::new(pool)
            .with_observer(ChangeInterceptor::new(Serializer::default(), queue));

        let cmd = RenameMealCommand {
            id,
            name: "Shurva".to_string(),
        };
        let meal = handle(store.clone(), cmd.clone()).await.unwrap();
        assert_eq!(meal.name, "Shurva");

        let record = rx.try_recv().unwrap();
        assert_eq!(record.operation, Operation::Update);
        assert_eq!(json!(record.before_data), json!({"name": "Shurpa"}));
        assert_eq!(json!(record.after_data), json!({"name": "Shurva"}));

        // same name again: nothing to flush
        handle(store, cmd).await.unwrap();
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_not_found(pool: PgPool) {
        let cmd = RenameMealCommand {
            id: 77,
            name: "Manti".to_string(),
        };
        let result = handle(EntityStore::new(pool), cmd).await;
        assert!(matches!(result, Err(RenameMealError::NotFound(77))));
    }
}
