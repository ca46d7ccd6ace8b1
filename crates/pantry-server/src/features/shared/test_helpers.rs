//! Test fixtures for database tests
//!
//! ```rust,ignore
//! use pantry_server::features::shared::test_helpers::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     let rice = TestIngredient::new("Rice").with_weight(1000.0).insert(&pool).await?;
//!     let plov = TestMeal::new("Plov").with_line(rice, 250.0).insert(&pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::PgPool;

/// Builder for ingredient rows, bypassing the change interceptor
#[derive(Debug, Clone)]
pub struct TestIngredient {
    pub name: String,
    pub weight: f64,
}

impl TestIngredient {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            weight: 0.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Insert and return the new id
    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar("INSERT INTO ingredient (name, weight) VALUES ($1, $2) RETURNING id")
            .bind(&self.name)
            .bind(self.weight)
            .fetch_one(pool)
            .await
    }
}

/// Builder for a meal and its recipe lines
#[derive(Debug, Clone)]
pub struct TestMeal {
    pub name: String,
    pub added_by: Option<i64>,
    pub lines: Vec<(i64, f64)>,
}

impl TestMeal {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            added_by: None,
            lines: Vec::new(),
        }
    }

    pub fn with_added_by(mut self, user_id: i64) -> Self {
        self.added_by = Some(user_id);
        self
    }

    /// Use `weight` grams of `ingredient_id` per portion
    pub fn with_line(mut self, ingredient_id: i64, weight: f64) -> Self {
        self.lines.push((ingredient_id, weight));
        self
    }

    /// Insert and return the new id
    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<i64> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO meal (name, added_by) VALUES ($1, $2) RETURNING id")
                .bind(&self.name)
                .bind(self.added_by)
                .fetch_one(pool)
                .await?;

        for (ingredient_id, weight) in self.lines {
            sqlx::query(
                "INSERT INTO meal_ingredient (meal_id, ingredient_id, weight) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(ingredient_id)
            .bind(weight)
            .execute(pool)
            .await?;
        }

        Ok(id)
    }
}

/// Insert an application user and return its id
pub async fn insert_user(pool: &PgPool, username: &str, role: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar("INSERT INTO app_user (username, role) VALUES ($1, $2) RETURNING id")
        .bind(username)
        .bind(role)
        .fetch_one(pool)
        .await
}
