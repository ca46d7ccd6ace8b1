pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateIngredientCommand, CreateIngredientError};
pub use delete::{DeleteIngredientCommand, DeleteIngredientError, DeleteIngredientResponse};
pub use update::{UpdateIngredientCommand, UpdateIngredientError};
