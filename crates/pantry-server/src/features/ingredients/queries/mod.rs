pub mod get;
pub mod list;

pub use get::{GetIngredientError, GetIngredientQuery};
pub use list::{ListIngredientsError, ListIngredientsQuery, ListIngredientsResponse};
