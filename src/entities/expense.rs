//! Expense entity - A submitted expense awaiting approval.
//!
//! Expenses move from `pending` to `approved` or `rejected`; either decision
//! stamps `approved_by` with the member who made it. Deleting that member
//! nulls the stamp out rather than deleting the expense.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Spend category of an expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Food purchases
    #[sea_orm(string_value = "groceries")]
    Groceries,
    /// Consumable supplies
    #[sea_orm(string_value = "supplies")]
    Supplies,
    /// Durable equipment
    #[sea_orm(string_value = "equipment")]
    Equipment,
    /// Utility bills
    #[sea_orm(string_value = "utilities")]
    Utilities,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Approval status of an expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Awaiting a decision
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Amount in dollars, always positive
    pub amount: f64,
    /// Spend category
    pub category: ExpenseCategory,
    /// Date the expense was incurred
    pub date: Date,
    /// Approval status
    pub status: ExpenseStatus,
    /// Member who submitted the expense
    pub submitted_by: i64,
    /// Member who approved or rejected it, once decided
    pub approved_by: Option<i64>,
    /// When the expense was submitted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense was submitted by one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::SubmittedBy",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Submitter,
    /// Each decided expense references the deciding member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::ApprovedBy",
        to = "super::member::Column::Id",
        on_delete = "SetNull"
    )]
    Approver,
}

impl ActiveModelBehavior for ActiveModel {}
