//! Meal entity - A planned meal event with a status lifecycle.
//!
//! Meals move `planned -> approved -> prepared`, with `cancelled` reachable
//! from `planned` and `approved`. Ingredient lines hang off each meal and
//! feed shopping-list generation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which meal of the day this event is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Morning meal
    #[sea_orm(string_value = "breakfast")]
    Breakfast,
    /// Midday meal
    #[sea_orm(string_value = "lunch")]
    Lunch,
    /// Evening meal
    #[sea_orm(string_value = "dinner")]
    Dinner,
    /// Snack
    #[sea_orm(string_value = "snack")]
    Snack,
}

/// Lifecycle status of a meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum MealStatus {
    /// Proposed, awaiting approval
    #[sea_orm(string_value = "planned")]
    Planned,
    /// Approved for preparation
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Prepared and served, terminal
    #[sea_orm(string_value = "prepared")]
    Prepared,
    /// Called off, terminal
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Meal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    /// Unique identifier for the meal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name, e.g. "Friday biryani"
    pub name: String,
    /// Longer description
    pub description: String,
    /// Which meal of the day
    pub meal_type: MealType,
    /// Date the meal is planned for
    pub date: Date,
    /// Time the meal is planned for
    pub time: Time,
    /// Estimated cost in dollars, always positive
    pub estimated_cost: f64,
    /// Actual cost in dollars, recorded when the meal is completed
    pub actual_cost: Option<f64>,
    /// Lifecycle status
    pub status: MealStatus,
    /// Member who created the meal
    pub created_by: i64,
    /// When the meal was created
    pub created_at: DateTimeUtc,
    /// When the meal was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Meal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each meal was created by one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::CreatedBy",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,
    /// One meal has many ingredient lines
    #[sea_orm(has_many = "super::ingredient::Entity")]
    Ingredients,
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
