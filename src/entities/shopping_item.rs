//! Shopping item entity - A single line on a shopping list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// List this item belongs to
    pub shopping_list_id: i64,
    /// Item name
    pub name: String,
    /// Quantity in the given unit
    pub quantity: f64,
    /// Free-form measurement unit
    pub unit: String,
    /// Estimated cost in dollars
    pub estimated_cost: f64,
    /// Actual cost in dollars, recorded at purchase
    pub actual_cost: Option<f64>,
    /// Whether the item has been purchased
    pub is_purchased: bool,
    /// Free-form notes
    pub notes: String,
}

/// Defines relationships between `ShoppingItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one shopping list
    #[sea_orm(
        belongs_to = "super::shopping_list::Entity",
        from = "Column::ShoppingListId",
        to = "super::shopping_list::Column::Id",
        on_delete = "Cascade"
    )]
    ShoppingList,
}

impl Related<super::shopping_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
