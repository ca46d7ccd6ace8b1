//! Menu management: meals and their recipes

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateMealCommand, CreateMealError, DeleteMealCommand, DeleteMealError, DeleteMealResponse,
    RemoveMealIngredientCommand, RemoveMealIngredientError, RenameMealCommand, RenameMealError,
    SetMealIngredientCommand, SetMealIngredientError, SetMealIngredientResponse,
};
pub use queries::{
    GetMealError, GetMealIngredientError, GetMealIngredientQuery, GetMealQuery,
    ListMealIngredientsError, ListMealIngredientsQuery, ListMealIngredientsResponse,
    ListMealsError, ListMealsQuery, ListMealsResponse, MealDetails,
};
pub use routes::meals_routes;
