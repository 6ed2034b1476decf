//! Meal tracking entity - The per-member-per-day consumption record.
//!
//! Each row says how many lunch and dinner units (0, 1, or 2) a member took
//! on a date. The cost fields are derived, never user-supplied: every save
//! recomputes them from the daily cost record for that date, so stored costs
//! reflect the allocator state as of the last write. At most one row per
//! `(member, date)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal tracking database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_meal_tracking")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member this record tracks
    pub member_id: i64,
    /// Calendar date this record tracks
    pub date: Date,
    /// Lunch units taken: 0, 1, or 2
    pub lunch_count: i32,
    /// Dinner units taken: 0, 1, or 2
    pub dinner_count: i32,
    /// Derived lunch cost in dollars
    pub lunch_cost: f64,
    /// Derived dinner cost in dollars
    pub dinner_cost: f64,
    /// Derived total cost in dollars
    pub total_cost: f64,
    /// Whether settlement has debited this record from the member's balance
    pub is_paid: bool,
    /// Free-form notes
    pub notes: String,
}

/// Defines relationships between `MealTracking` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each tracking record belongs to one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
