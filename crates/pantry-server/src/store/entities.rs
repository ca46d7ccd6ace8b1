//! SQL for each tracked entity

use async_trait::async_trait;
use sqlx::PgConnection;

use super::Persist;
use crate::models::{Ingredient, IngredientDelivery, Meal, MealIngredient, MealServing};

const MEAL_COLUMNS: &str = "id, name, added_by, created_at, updated_at";
const INGREDIENT_COLUMNS: &str = "id, name, weight, created_at, updated_at";
const MEAL_INGREDIENT_COLUMNS: &str = "meal_id, ingredient_id, weight";
const MEAL_SERVING_COLUMNS: &str = "id, meal_id, served_by, created_at, updated_at";
const DELIVERY_COLUMNS: &str = "id, ingredient_id, weight, accepted, created_at, updated_at";

#[async_trait]
impl Persist for Meal {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    async fn fetch(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meal WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Meal>(&format!(
            "INSERT INTO meal (name, added_by) VALUES ($1, $2) RETURNING {MEAL_COLUMNS}"
        ))
        .bind(&self.name)
        .bind(self.added_by)
        .fetch_one(&mut *conn)
        .await
    }

    async fn update(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Meal>(&format!(
            "UPDATE meal SET name = $2, added_by = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {MEAL_COLUMNS}"
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(self.added_by)
        .fetch_one(&mut *conn)
        .await
    }

    async fn delete(&self, conn: &mut PgConnection) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM meal WHERE id = $1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Persist for Ingredient {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    async fn fetch(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredient WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "INSERT INTO ingredient (name, weight) VALUES ($1, $2) RETURNING {INGREDIENT_COLUMNS}"
        ))
        .bind(&self.name)
        .bind(self.weight)
        .fetch_one(&mut *conn)
        .await
    }

    async fn update(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "UPDATE ingredient SET name = $2, weight = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {INGREDIENT_COLUMNS}"
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(self.weight)
        .fetch_one(&mut *conn)
        .await
    }

    async fn delete(&self, conn: &mut PgConnection) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM ingredient WHERE id = $1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Persist for MealIngredient {
    /// `(meal_id, ingredient_id)`
    type Key = (i64, i64);

    fn key(&self) -> (i64, i64) {
        (self.meal_id, self.ingredient_id)
    }

    async fn fetch(conn: &mut PgConnection, key: (i64, i64)) -> sqlx::Result<Option<Self>> {
        let (meal_id, ingredient_id) = key;
        sqlx::query_as::<_, MealIngredient>(&format!(
            "SELECT {MEAL_INGREDIENT_COLUMNS} FROM meal_ingredient \
             WHERE meal_id = $1 AND ingredient_id = $2 FOR UPDATE"
        ))
        .bind(meal_id)
        .bind(ingredient_id)
        .fetch_optional(&mut *conn)
        .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, MealIngredient>(&format!(
            "INSERT INTO meal_ingredient (meal_id, ingredient_id, weight) VALUES ($1, $2, $3) \
             RETURNING {MEAL_INGREDIENT_COLUMNS}"
        ))
        .bind(self.meal_id)
        .bind(self.ingredient_id)
        .bind(self.weight)
        .fetch_one(&mut *conn)
        .await
    }

    async fn update(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, MealIngredient>(&format!(
            "UPDATE meal_ingredient SET weight = $3 WHERE meal_id = $1 AND ingredient_id = $2 \
             RETURNING {MEAL_INGREDIENT_COLUMNS}"
        ))
        .bind(self.meal_id)
        .bind(self.ingredient_id)
        .bind(self.weight)
        .fetch_one(&mut *conn)
        .await
    }

    async fn delete(&self, conn: &mut PgConnection) -> sqlx::Result<bool> {
        let result =
            sqlx::query("DELETE FROM meal_ingredient WHERE meal_id = $1 AND ingredient_id = $2")
                .bind(self.meal_id)
                .bind(self.ingredient_id)
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl MealIngredient {
    /// Recipe lines of one meal, ordered by ingredient
    pub async fn for_meal(conn: &mut PgConnection, meal_id: i64) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, MealIngredient>(&format!(
            "SELECT {MEAL_INGREDIENT_COLUMNS} FROM meal_ingredient \
             WHERE meal_id = $1 ORDER BY ingredient_id"
        ))
        .bind(meal_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Recipe lines that use one ingredient, ordered by meal
    pub async fn for_ingredient(
        conn: &mut PgConnection,
        ingredient_id: i64,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, MealIngredient>(&format!(
            "SELECT {MEAL_INGREDIENT_COLUMNS} FROM meal_ingredient \
             WHERE ingredient_id = $1 ORDER BY meal_id"
        ))
        .bind(ingredient_id)
        .fetch_all(&mut *conn)
        .await
    }
}

#[async_trait]
impl Persist for MealServing {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    async fn fetch(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, MealServing>(&format!(
            "SELECT {MEAL_SERVING_COLUMNS} FROM meal_serving WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, MealServing>(&format!(
            "INSERT INTO meal_serving (meal_id, served_by) VALUES ($1, $2) \
             RETURNING {MEAL_SERVING_COLUMNS}"
        ))
        .bind(self.meal_id)
        .bind(self.served_by)
        .fetch_one(&mut *conn)
        .await
    }

    async fn update(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, MealServing>(&format!(
            "UPDATE meal_serving SET meal_id = $2, served_by = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {MEAL_SERVING_COLUMNS}"
        ))
        .bind(self.id)
        .bind(self.meal_id)
        .bind(self.served_by)
        .fetch_one(&mut *conn)
        .await
    }

    async fn delete(&self, conn: &mut PgConnection) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM meal_serving WHERE id = $1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Persist for IngredientDelivery {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    async fn fetch(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, IngredientDelivery>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM ingredient_delivery WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, IngredientDelivery>(&format!(
            "INSERT INTO ingredient_delivery (ingredient_id, weight, accepted) VALUES ($1, $2, $3) \
             RETURNING {DELIVERY_COLUMNS}"
        ))
        .bind(self.ingredient_id)
        .bind(self.weight)
        .bind(self.accepted)
        .fetch_one(&mut *conn)
        .await
    }

    async fn update(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, IngredientDelivery>(&format!(
            "UPDATE ingredient_delivery SET ingredient_id = $2, weight = $3, accepted = $4, \
             updated_at = NOW() WHERE id = $1 RETURNING {DELIVERY_COLUMNS}"
        ))
        .bind(self.id)
        .bind(self.ingredient_id)
        .bind(self.weight)
        .bind(self.accepted)
        .fetch_one(&mut *conn)
        .await
    }

    async fn delete(&self, conn: &mut PgConnection) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM ingredient_delivery WHERE id = $1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
