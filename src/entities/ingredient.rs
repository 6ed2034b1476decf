//! Ingredient entity - A single ingredient line on a planned meal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Measurement unit for an ingredient quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum IngredientUnit {
    /// Kilogram
    #[sea_orm(string_value = "kg")]
    Kg,
    /// Gram
    #[sea_orm(string_value = "g")]
    G,
    /// Liter
    #[sea_orm(string_value = "l")]
    L,
    /// Milliliter
    #[sea_orm(string_value = "ml")]
    Ml,
    /// Pieces
    #[sea_orm(string_value = "pcs")]
    Pcs,
    /// Cups
    #[sea_orm(string_value = "cups")]
    Cups,
    /// Tablespoon
    #[sea_orm(string_value = "tbsp")]
    Tbsp,
    /// Teaspoon
    #[sea_orm(string_value = "tsp")]
    Tsp,
}

/// Ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    /// Unique identifier for the ingredient line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Meal this line belongs to
    pub meal_id: i64,
    /// Ingredient name, e.g. "rice"
    pub name: String,
    /// Quantity in the given unit
    pub quantity: f64,
    /// Measurement unit
    pub unit: IngredientUnit,
    /// Estimated cost in dollars
    pub estimated_cost: f64,
}

/// Defines relationships between Ingredient and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ingredient line belongs to one meal
    #[sea_orm(
        belongs_to = "super::meal::Entity",
        from = "Column::MealId",
        to = "super::meal::Column::Id",
        on_delete = "Cascade"
    )]
    Meal,
}

impl Related<super::meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
