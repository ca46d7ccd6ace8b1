use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::features::shared::{is_foreign_key_violation, is_positive_weight};
use crate::models::MealIngredient;
use crate::store::EntityStore;

/// Create or change the recipe line for one ingredient of a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMealIngredientCommand {
    /// Taken from the path
    #[serde(default, skip_serializing)]
    pub meal_id: i64,
    /// Taken from the path
    #[serde(default, skip_serializing)]
    pub ingredient_id: i64,
    /// Grams per portion
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMealIngredientResponse {
    #[serde(flatten)]
    pub line: MealIngredient,
    /// `true` when the line did not exist before
    pub created: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SetMealIngredientError {
    #[error("Weight must be a positive number of grams")]
    InvalidWeight,
    #[error("Meal {meal_id} or ingredient {ingredient_id} not found")]
    NotFound { meal_id: i64, ingredient_id: i64 },
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<SetMealIngredientResponse, SetMealIngredientError>>
    for SetMealIngredientCommand
{
}

impl crate::cqrs::middleware::Command for SetMealIngredientCommand {}

impl SetMealIngredientCommand {
    pub fn validate(&self) -> Result<(), SetMealIngredientError> {
        if !is_positive_weight(self.weight) {
            return Err(SetMealIngredientError::InvalidWeight);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: SetMealIngredientCommand,
) -> Result<SetMealIngredientResponse, SetMealIngredientError> {
    command.validate()?;
    let key = (command.meal_id, command.ingredient_id);

    let mut uow = store.begin().await?;
    let (line, created) = match uow.find::<MealIngredient>(key).await? {
        Some(mut line) => {
            line.get_mut().weight = command.weight;
            uow.update(&mut line).await?;
            (line, false)
        },
        None => {
            let draft = MealIngredient {
                meal_id: command.meal_id,
                ingredient_id: command.ingredient_id,
                weight: command.weight,
            };
            let line = uow.insert(draft).await.map_err(|e| {
                if e.database_error().is_some_and(is_foreign_key_violation) {
                    SetMealIngredientError::NotFound {
                        meal_id: command.meal_id,
                        ingredient_id: command.ingredient_id,
                    }
                } else {
                    SetMealIngredientError::Store(e)
                }
            })?;
            (line, true)
        },
    };
    uow.commit().await?;

    Ok(SetMealIngredientResponse {
        line: line.into_inner(),
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ChangeInterceptor, ChangeQueue, Operation};
    use crate::features::shared::test_helpers::{TestIngredient, TestMeal};
    use pantry_common::serializer::Serializer;
    use serde_json::json;
    use sqlx::PgPool;

    #[test]
    fn test_validation() {
        let cmd = SetMealIngredientCommand {
            meal_id: 1,
            ingredient_id: 1,
            weight: 0.0,
        };
        assert!(matches!(cmd.validate(), Err(SetMealIngredientError::InvalidWeight)));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_creates_then_updates(pool: PgPool) -> sqlx::Result<()> {
        let rice = TestIngredient::new("Rice").insert(&pool).await?;
        let meal = TestMeal::new("Plov").insert(&pool).await?;
        let (queue, mut rx) = ChangeQueue::unbounded();
        let store = EntityStore::new(pool)
            .with_observer(ChangeInterceptor::new(Serializer::default(), queue));

        let cmd = |weight| SetMealIngredientCommand {
            meal_id: meal,
            ingredient_id: rice,
            weight,
        };

        let first = handle(store.clone(), cmd(200.0)).await.unwrap();
        assert!(first.created);
        let second = handle(store, cmd(250.0)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.line.weight, 250.0);

        let create = rx.try_recv().unwrap();
        assert_eq!(create.operation, Operation::Create);
        assert_eq!(
            json!(create.after_data),
            json!({"meal_id": meal, "ingredient_id": rice, "weight": 200.0})
        );
        let update = rx.try_recv().unwrap();
        assert_eq!(json!(update.before_data), json!({"weight": 200.0}));
        assert_eq!(json!(update.after_data), json!({"weight": 250.0}));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_unknown_meal(pool: PgPool) -> sqlx::Result<()> {
        let rice = TestIngredient::new("Rice").insert(&pool).await?;
        let cmd = SetMealIngredientCommand {
            meal_id: 404,
            ingredient_id: rice,
            weight: 10.0,
        };

        let result = handle(EntityStore::new(pool), cmd).await;
        assert!(matches!(result, Err(SetMealIngredientError::NotFound { meal_id: 404, .. })));
        Ok(())
    }
}
