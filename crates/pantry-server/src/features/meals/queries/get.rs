use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::{Meal, MealIngredient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMealQuery {
    pub id: i64,
}

/// A meal together with its recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealDetails {
    #[serde(flatten)]
    pub meal: Meal,
    pub ingredients: Vec<MealIngredient>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetMealError {
    #[error("Meal {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<MealDetails, GetMealError>> for GetMealQuery {}

impl crate::cqrs::middleware::Query for GetMealQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetMealQuery) -> Result<MealDetails, GetMealError> {
    let meal = sqlx::query_as::<_, Meal>(
        "SELECT id, name, added_by, created_at, updated_at FROM meal WHERE id = $1",
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetMealError::NotFound(query.id))?;

    let ingredients = sqlx::query_as::<_, MealIngredient>(
        "SELECT meal_id, ingredient_id, weight FROM meal_ingredient WHERE meal_id = $1 ORDER BY ingredient_id",
    )
    .bind(meal.id)
    .fetch_all(&pool)
    .await?;

    Ok(MealDetails { meal, ingredients })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestIngredient, TestMeal};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_includes_recipe(pool: PgPool) -> sqlx::Result<()> {
        let rice = TestIngredient::new("Rice").insert(&pool).await?;
        let carrot = TestIngredient::new("Carrot").insert(&pool).await?;
        let id = TestMeal::new("Plov")
            .with_line(carrot, 80.0)
            .with_line(rice, 150.0)
            .insert(&pool)
            .await?;

        let details = handle(pool, GetMealQuery { id }).await.unwrap();
        assert_eq!(details.meal.name, "Plov");
        let lines: Vec<_> = details
            .ingredients
            .iter()
            .map(|line| (line.ingredient_id, line.weight))
            .collect();
        assert_eq!(lines, [(rice, 150.0), (carrot, 80.0)]);

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"], "Plov");
        assert_eq!(json["ingredients"].as_array().unwrap().len(), 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_missing(pool: PgPool) {
        let result = handle(pool, GetMealQuery { id: 77 }).await;
        assert!(matches!(result, Err(GetMealError::NotFound(77))));
    }
}
