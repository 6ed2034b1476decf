//! Shopping list entity - A dated list of items to purchase.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Progress status of a shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(12))")]
#[serde(rename_all = "snake_case")]
pub enum ShoppingStatus {
    /// Not started
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Shopping underway
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// All done
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Shopping list database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_lists")]
pub struct Model {
    /// Unique identifier for the list
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name
    pub name: String,
    /// When the list was created
    pub date_created: DateTimeUtc,
    /// Date the purchases are needed by
    pub date_needed: Date,
    /// Progress status
    pub status: ShoppingStatus,
    /// Member who created the list
    pub created_by: i64,
    /// Sum of estimated item costs in dollars
    pub total_estimated_cost: f64,
    /// Sum of actual costs over purchased items, once any are recorded
    pub total_actual_cost: Option<f64>,
}

/// Defines relationships between `ShoppingList` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each list was created by one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::CreatedBy",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,
    /// One list has many items
    #[sea_orm(has_many = "super::shopping_item::Entity")]
    Items,
}

impl Related<super::shopping_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
