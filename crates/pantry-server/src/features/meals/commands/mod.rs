pub mod create;
pub mod delete;
pub mod remove_ingredient;
pub mod rename;
pub mod set_ingredient;

pub use create::{CreateMealCommand, CreateMealError};
pub use delete::{DeleteMealCommand, DeleteMealError, DeleteMealResponse};
pub use remove_ingredient::{RemoveMealIngredientCommand, RemoveMealIngredientError};
pub use rename::{RenameMealCommand, RenameMealError};
pub use set_ingredient::{
    SetMealIngredientCommand, SetMealIngredientError, SetMealIngredientResponse,
};
