//! Monthly deposit entity - An immutable credit event for one member in one
//! calendar month.
//!
//! At most one deposit may exist per `(member, month)`; the month column
//! always holds the first day of the month. Creating a deposit also credits
//! the member's `current_balance`, both inside one transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly deposit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_deposits")]
pub struct Model {
    /// Unique identifier for the deposit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member the deposit credits
    pub member_id: i64,
    /// Deposit amount in dollars, always positive
    pub amount: f64,
    /// First day of the month this deposit covers
    pub month: Date,
    /// When the deposit was recorded
    pub deposit_date: DateTimeUtc,
    /// Free-form notes
    pub notes: String,
}

/// Defines relationships between `MonthlyDeposit` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deposit belongs to one member
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
