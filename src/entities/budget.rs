//! Budget entity - A spending envelope over a date range.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name
    pub name: String,
    /// Total budgeted amount in dollars, always positive
    pub total_amount: f64,
    /// Amount spent so far in dollars
    pub spent_amount: f64,
    /// First day the budget covers
    pub start_date: Date,
    /// Last day the budget covers
    pub end_date: Date,
    /// Member who created the budget
    pub created_by: i64,
    /// When the budget was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Amount still available in dollars.
    #[must_use]
    pub fn remaining_amount(&self) -> f64 {
        self.total_amount - self.spent_amount
    }

    /// Share of the budget already spent, as a percentage. Zero when the
    /// total amount is zero.
    #[must_use]
    pub fn utilization_percentage(&self) -> f64 {
        if self.total_amount > 0.0 {
            (self.spent_amount / self.total_amount) * 100.0
        } else {
            0.0
        }
    }
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget was created by one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::CreatedBy",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
