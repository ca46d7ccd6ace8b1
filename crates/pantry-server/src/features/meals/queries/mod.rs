pub mod get;
pub mod get_ingredient;
pub mod list;
pub mod list_ingredients;

pub use get::{GetMealError, GetMealQuery, MealDetails};
pub use get_ingredient::{GetMealIngredientError, GetMealIngredientQuery};
pub use list::{ListMealsError, ListMealsQuery, ListMealsResponse};
pub use list_ingredients::{
    ListMealIngredientsError, ListMealIngredientsQuery, ListMealIngredientsResponse,
};
