use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::audit::Tracked;
use crate::error::ServerError;
use crate::models::{Meal, MealIngredient};
use crate::store::EntityStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMealCommand {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMealResponse {
    pub id: i64,
    pub deleted: bool,
    /// Recipe lines removed along with the meal
    pub removed_lines: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteMealError {
    #[error("Meal {0} not found")]
    NotFound(i64),
    #[error("Cannot delete meal {0}: it has been served")]
    HasServings(i64),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<DeleteMealResponse, DeleteMealError>> for DeleteMealCommand {}

impl crate::cqrs::middleware::Command for DeleteMealCommand {}

/// Recipe lines are deleted one by one first so each gets its own change record.
/// A meal that has been served is refused before anything is written; the meal
/// row stays locked from that check on, so no serving can be added behind it.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: EntityStore,
    command: DeleteMealCommand,
) -> Result<DeleteMealResponse, DeleteMealError> {
    let mut uow = store.begin().await?;
    let meal = uow
        .find::<Meal>(command.id)
        .await?
        .ok_or(DeleteMealError::NotFound(command.id))?;

    let served: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM meal_serving WHERE meal_id = $1)")
            .bind(command.id)
            .fetch_one(uow.conn())
            .await
            .map_err(ServerError::from)?;
    if served {
        return Err(DeleteMealError::HasServings(command.id));
    }

    let lines = MealIngredient::for_meal(uow.conn(), command.id)
        .await
        .map_err(ServerError::from)?;
    let mut removed_lines = 0;
    for line in lines {
        if uow.delete(Tracked::new(line)).await? {
            removed_lines += 1;
        }
    }

    let deleted = uow.delete(meal).await?;
    uow.commit().await?;

    Ok(DeleteMealResponse {
        id: command.id,
        deleted,
        removed_lines,
    })
}
