//! Budget business logic - Spending envelopes over date ranges.

use crate::{
    entities::{Budget, budget, member},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Parameters for creating a budget.
#[derive(Debug, Clone)]
pub struct NewBudget {
    /// Human-readable name
    pub name: String,
    /// Total budgeted amount in dollars, must be positive
    pub total_amount: f64,
    /// First day the budget covers
    pub start_date: Date,
    /// Last day the budget covers
    pub end_date: Date,
}

/// Optional field changes for updating a budget.
#[derive(Debug, Clone, Default)]
pub struct BudgetChanges {
    /// New name
    pub name: Option<String>,
    /// New total amount
    pub total_amount: Option<f64>,
    /// New spent amount
    pub spent_amount: Option<f64>,
    /// New start date
    pub start_date: Option<Date>,
    /// New end date
    pub end_date: Option<Date>,
}

/// Creates a budget with nothing spent yet, owned by the acting member.
pub async fn create_budget(
    db: &DatabaseConnection,
    actor: &member::Model,
    new: NewBudget,
) -> Result<budget::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Budget name cannot be empty".to_string(),
        });
    }
    if !new.total_amount.is_finite() || new.total_amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.total_amount,
        });
    }
    if new.end_date < new.start_date {
        return Err(Error::Validation {
            message: "Budget end date must not precede its start date".to_string(),
        });
    }

    let model = budget::ActiveModel {
        name: Set(new.name.trim().to_string()),
        total_amount: Set(new.total_amount),
        spent_amount: Set(0.0),
        start_date: Set(new.start_date),
        end_date: Set(new.end_date),
        created_by: Set(actor.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Retrieves budgets, newest start date first. With `active_on` set, only
/// budgets whose range covers that date are returned.
pub async fn list_budgets(
    db: &DatabaseConnection,
    active_on: Option<Date>,
) -> Result<Vec<budget::Model>> {
    let mut query = Budget::find();
    if let Some(today) = active_on {
        query = query
            .filter(budget::Column::StartDate.lte(today))
            .filter(budget::Column::EndDate.gte(today));
    }
    query
        .order_by_desc(budget::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a budget by its unique ID.
pub async fn get_budget_by_id(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<Option<budget::Model>> {
    Budget::find_by_id(budget_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies the given field changes to a budget.
pub async fn update_budget(
    db: &DatabaseConnection,
    budget_id: i64,
    changes: BudgetChanges,
) -> Result<budget::Model> {
    let budget = get_budget_by_id(db, budget_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "budget",
            id: budget_id.to_string(),
        })?;

    if let Some(amount) = changes.total_amount {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }
    if let Some(amount) = changes.spent_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let mut active: budget::ActiveModel = budget.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(total_amount) = changes.total_amount {
        active.total_amount = Set(total_amount);
    }
    if let Some(spent_amount) = changes.spent_amount {
        active.spent_amount = Set(spent_amount);
    }
    if let Some(start_date) = changes.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = changes.end_date {
        active.end_date = Set(end_date);
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes a budget.
pub async fn delete_budget(db: &DatabaseConnection, budget_id: i64) -> Result<()> {
    let budget = get_budget_by_id(db, budget_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "budget",
            id: budget_id.to_string(),
        })?;
    let active: budget::ActiveModel = budget.into();
    active.delete(db).await?;
    Ok(())
}
