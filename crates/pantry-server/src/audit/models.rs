//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::actor::ActorId;

// ============================================================================
// Log Page Constants
// ============================================================================

/// Default number of log entries returned per page
pub const DEFAULT_LOG_PAGE_LIMIT: i64 = 10;

/// Maximum number of log entries that can be returned in a single page
pub const MAX_LOG_PAGE_LIMIT: i64 = 100;

/// Column image of a change record, keyed by column name
pub type ColumnImage = Map<String, JsonValue>;

/// Kind of mutation recorded in the change log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "change_operation", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tables whose mutations are written to the change log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedTable {
    Meal,
    Ingredient,
    MealIngredient,
    MealServing,
    IngredientDelivery,
}

impl TrackedTable {
    /// Every tracked table, in registration order
    pub const ALL: [TrackedTable; 5] = [
        Self::Meal,
        Self::Ingredient,
        Self::MealIngredient,
        Self::MealServing,
        Self::IngredientDelivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meal => "meal",
            Self::Ingredient => "ingredient",
            Self::MealIngredient => "meal_ingredient",
            Self::MealServing => "meal_serving",
            Self::IngredientDelivery => "ingredient_delivery",
        }
    }
}

impl std::fmt::Display for TrackedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A change record built by the interceptor, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChangeRecord {
    pub table_name: TrackedTable,
    pub operation: Operation,
    /// Prior column values; absent for CREATE
    pub before_data: Option<ColumnImage>,
    /// New column values; absent for DELETE
    pub after_data: Option<ColumnImage>,
    pub actor_id: Option<ActorId>,
    pub created_at: DateTime<Utc>,
}

/// Change log entry from the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChangeRecord {
    pub id: i64,
    /// Acting user (nullable for system writes)
    pub user_id: Option<i64>,
    pub table_name: String,
    pub operation: Operation,
    pub before_data: Option<JsonValue>,
    pub after_data: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of a single log table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPage<T> {
    pub total_count: i64,
    pub items: Vec<T>,
}

pub type ChangeLogPage = LogPage<ChangeRecord>;
pub type LoginInfoPage = LogPage<LoginInfoEntry>;
pub type ActionLogPage = LogPage<ActionLogEntry>;

/// Per-request action log row written by the audit middleware
#[derive(Debug, Clone, Default)]
pub struct NewActionLog {
    pub user_id: Option<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub query: String,
    pub method: String,
    pub path: String,
    pub status_code: i32,
    /// Seconds, rounded to four decimals
    pub process_time: f64,
    pub client_host: String,
}

/// Action log entry from the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActionLogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub query: String,
    pub method: String,
    pub path: String,
    pub status_code: i32,
    pub process_time: f64,
    pub client_host: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authentication event from the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoginInfoEntry {
    pub id: i64,
    pub user_id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    pub login_at: DateTime<Utc>,
}

/// Predicate shared by every log source, applied to each source's own columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub user_id: Option<i64>,
    /// Inclusive lower bound
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub end_time: Option<DateTime<Utc>>,
}
