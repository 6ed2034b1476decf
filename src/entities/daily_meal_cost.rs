//! Daily meal cost entity - The per-calendar-day aggregate cost record.
//!
//! One record per date holds the total lunch and dinner cost and how many
//! members participated in each. Per-person unit costs are derived from
//! these fields and are never stored here; see `core::costs`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Daily meal cost database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_meal_costs")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar date, unique across records
    #[sea_orm(unique)]
    pub date: Date,
    /// Total lunch cost for the date in dollars
    pub lunch_cost: f64,
    /// Total dinner cost for the date in dollars
    pub dinner_cost: f64,
    /// Number of members who took lunch on this date
    pub lunch_participants: i32,
    /// Number of members who took dinner on this date
    pub dinner_participants: i32,
}

/// Defines relationships between `DailyMealCost` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
