//! Serving meals from stock

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{ConsumedIngredient, ServeMealCommand, ServeMealError, ServeMealResponse};
pub use queries::{ListServingsError, ListServingsQuery, ListServingsResponse};
pub use routes::servings_routes;
