//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod auth_token;
pub mod budget;
pub mod daily_meal_cost;
pub mod expense;
pub mod ingredient;
pub mod meal;
pub mod meal_tracking;
pub mod member;
pub mod monthly_deposit;
pub mod shopping_item;
pub mod shopping_list;

// Re-export specific types to avoid conflicts
pub use auth_token::{Column as AuthTokenColumn, Entity as AuthToken, Model as AuthTokenModel};
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use daily_meal_cost::{
    Column as DailyMealCostColumn, Entity as DailyMealCost, Model as DailyMealCostModel,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use ingredient::{Column as IngredientColumn, Entity as Ingredient, Model as IngredientModel};
pub use meal::{Column as MealColumn, Entity as Meal, Model as MealModel};
pub use meal_tracking::{
    Column as MealTrackingColumn, Entity as MealTracking, Model as MealTrackingModel,
};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use monthly_deposit::{
    Column as MonthlyDepositColumn, Entity as MonthlyDeposit, Model as MonthlyDepositModel,
};
pub use shopping_item::{
    Column as ShoppingItemColumn, Entity as ShoppingItem, Model as ShoppingItemModel,
};
pub use shopping_list::{
    Column as ShoppingListColumn, Entity as ShoppingList, Model as ShoppingListModel,
};
