pub mod create;

pub use create::{ConsumedIngredient, ServeMealCommand, ServeMealError, ServeMealResponse};
