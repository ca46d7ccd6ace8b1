//! Ingredient stock management

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateIngredientCommand, CreateIngredientError, DeleteIngredientCommand,
    DeleteIngredientError, DeleteIngredientResponse, UpdateIngredientCommand,
    UpdateIngredientError,
};
pub use queries::{
    GetIngredientError, GetIngredientQuery, ListIngredientsError, ListIngredientsQuery,
    ListIngredientsResponse,
};
pub use routes::ingredients_routes;
