//! Expense business logic - Submitted expenses and their approval flow.
//!
//! Expenses start `pending` and are decided exactly once: `approve` or
//! `reject`, either of which stamps the acting member. The actor is always
//! passed in explicitly; core code never reads ambient request state.

use crate::{
    entities::{
        Expense,
        expense::{self, ExpenseStatus},
        member,
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveEnum, QueryOrder, Set, prelude::*};

/// Parameters for submitting an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Amount in dollars, must be positive
    pub amount: f64,
    /// Spend category
    pub category: expense::ExpenseCategory,
    /// Date the expense was incurred
    pub date: Date,
}

/// Optional field changes for updating an expense.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New amount
    pub amount: Option<f64>,
    /// New category
    pub category: Option<expense::ExpenseCategory>,
    /// New incurred date
    pub date: Option<Date>,
}

/// Filters for listing expenses. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Restrict to one category
    pub category: Option<expense::ExpenseCategory>,
    /// Restrict to one status
    pub status: Option<ExpenseStatus>,
    /// Restrict to one incurred date
    pub date: Option<Date>,
}

/// Submits a new expense in `pending` status for the acting member.
pub async fn create_expense(
    db: &DatabaseConnection,
    actor: &member::Model,
    new: NewExpense,
) -> Result<expense::Model> {
    if new.title.trim().is_empty() {
        return Err(Error::Validation {
            message: "Expense title cannot be empty".to_string(),
        });
    }
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    let model = expense::ActiveModel {
        title: Set(new.title.trim().to_string()),
        description: Set(new.description),
        amount: Set(new.amount),
        category: Set(new.category),
        date: Set(new.date),
        status: Set(ExpenseStatus::Pending),
        submitted_by: Set(actor.id),
        approved_by: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Retrieves expenses matching the filter, newest incurred date first.
pub async fn list_expenses(
    db: &DatabaseConnection,
    filter: &ExpenseFilter,
) -> Result<Vec<expense::Model>> {
    let mut query = Expense::find();
    if let Some(ref category) = filter.category {
        query = query.filter(expense::Column::Category.eq(category.clone()));
    }
    if let Some(ref status) = filter.status {
        query = query.filter(expense::Column::Status.eq(status.clone()));
    }
    if let Some(date) = filter.date {
        query = query.filter(expense::Column::Date.eq(date));
    }
    query
        .order_by_desc(expense::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an expense by its unique ID.
pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn require_expense(expense: Option<expense::Model>, expense_id: i64) -> Result<expense::Model> {
    expense.ok_or_else(|| Error::NotFound {
        entity: "expense",
        id: expense_id.to_string(),
    })
}

/// Applies the given field changes to an expense.
pub async fn update_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    changes: ExpenseChanges,
) -> Result<expense::Model> {
    let expense = require_expense(get_expense_by_id(db, expense_id).await?, expense_id)?;

    if let Some(amount) = changes.amount {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let mut active: expense::ActiveModel = expense.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(amount) = changes.amount {
        active.amount = Set(amount);
    }
    if let Some(category) = changes.category {
        active.category = Set(category);
    }
    if let Some(date) = changes.date {
        active.date = Set(date);
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes an expense.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    let expense = require_expense(get_expense_by_id(db, expense_id).await?, expense_id)?;
    let active: expense::ActiveModel = expense.into();
    active.delete(db).await?;
    Ok(())
}

async fn decide(
    db: &DatabaseConnection,
    expense_id: i64,
    actor: &member::Model,
    to: ExpenseStatus,
    action: &'static str,
) -> Result<expense::Model> {
    let expense = require_expense(get_expense_by_id(db, expense_id).await?, expense_id)?;

    if expense.status != ExpenseStatus::Pending {
        return Err(Error::InvalidTransition {
            entity: "expense",
            status: expense.status.to_value(),
            action,
        });
    }

    let mut active: expense::ActiveModel = expense.into();
    active.status = Set(to);
    active.approved_by = Set(Some(actor.id));
    active.update(db).await.map_err(Into::into)
}

/// Approves a pending expense, stamping the acting member.
pub async fn approve_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    actor: &member::Model,
) -> Result<expense::Model> {
    decide(db, expense_id, actor, ExpenseStatus::Approved, "approve").await
}

/// Rejects a pending expense, stamping the acting member.
pub async fn reject_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    actor: &member::Model,
) -> Result<expense::Model> {
    decide(db, expense_id, actor, ExpenseStatus::Rejected, "reject").await
}
