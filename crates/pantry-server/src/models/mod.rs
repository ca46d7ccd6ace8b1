//! Database models
//!
//! Every model here is a tracked entity: its mutations go through
//! [`crate::store::UnitOfWork`] and end up in the change log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::audit::{Row, TrackedEntity, TrackedTable};

/// A dish on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    /// User who added the meal
    pub added_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stocked ingredient; `weight` is the quantity on hand in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Grams of an ingredient used by one portion of a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealIngredient {
    pub meal_id: i64,
    pub ingredient_id: i64,
    pub weight: f64,
}

/// One portion of a meal served by a cook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealServing {
    pub id: i64,
    pub meal_id: i64,
    pub served_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingredient stock received from a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct IngredientDelivery {
    pub id: i64,
    pub ingredient_id: i64,
    /// Grams delivered
    pub weight: f64,
    /// Staff member who accepted the delivery
    pub accepted: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    pub fn new(name: String, added_by: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by database
            name,
            added_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Ingredient {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by database
            name,
            weight: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl MealServing {
    pub fn new(meal_id: i64, served_by: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by database
            meal_id,
            served_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl IngredientDelivery {
    pub fn new(ingredient_id: i64, weight: f64, accepted: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by database
            ingredient_id,
            weight,
            accepted,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TrackedEntity for Meal {
    const TABLE: TrackedTable = TrackedTable::Meal;

    fn to_row(&self) -> Row {
        Row::from([
            ("id", self.id.into()),
            ("name", self.name.as_str().into()),
            ("added_by", self.added_by.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
        ])
    }
}

impl TrackedEntity for Ingredient {
    const TABLE: TrackedTable = TrackedTable::Ingredient;

    fn to_row(&self) -> Row {
        Row::from([
            ("id", self.id.into()),
            ("name", self.name.as_str().into()),
            ("weight", self.weight.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
        ])
    }
}

impl TrackedEntity for MealIngredient {
    const TABLE: TrackedTable = TrackedTable::MealIngredient;

    fn to_row(&self) -> Row {
        Row::from([
            ("meal_id", self.meal_id.into()),
            ("ingredient_id", self.ingredient_id.into()),
            ("weight", self.weight.into()),
        ])
    }
}

impl TrackedEntity for MealServing {
    const TABLE: TrackedTable = TrackedTable::MealServing;

    fn to_row(&self) -> Row {
        Row::from([
            ("id", self.id.into()),
            ("meal_id", self.meal_id.into()),
            ("served_by", self.served_by.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
        ])
    }
}

impl TrackedEntity for IngredientDelivery {
    const TABLE: TrackedTable = TrackedTable::IngredientDelivery;

    fn to_row(&self) -> Row {
        Row::from([
            ("id", self.id.into()),
            ("ingredient_id", self.ingredient_id.into()),
            ("weight", self.weight.into()),
            ("accepted", self.accepted.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
        ])
    }
}
