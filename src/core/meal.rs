//! Meal business logic - Planned meals, their ingredients, and the status
//! lifecycle.
//!
//! Meals move `planned -> approved -> prepared`; `planned` and `approved`
//! may also be cancelled. Invalid transitions are rejected with the current
//! status reported and no state change.

use crate::{
    entities::{
        Ingredient, Meal, ingredient,
        meal::{self, MealStatus},
        member,
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveEnum, QueryOrder, Set, TransactionTrait, prelude::*};

/// Parameters for creating a meal.
#[derive(Debug, Clone)]
pub struct NewMeal {
    /// Human-readable name
    pub name: String,
    /// Longer description
    pub description: String,
    /// Which meal of the day
    pub meal_type: meal::MealType,
    /// Date the meal is planned for
    pub date: Date,
    /// Time the meal is planned for
    pub time: Time,
    /// Estimated cost in dollars, must be positive
    pub estimated_cost: f64,
}

/// Optional field changes for updating a meal. `None` fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct MealChanges {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New meal-of-day classification
    pub meal_type: Option<meal::MealType>,
    /// New date
    pub date: Option<Date>,
    /// New time
    pub time: Option<Time>,
    /// New estimated cost
    pub estimated_cost: Option<f64>,
}

/// Filters for listing meals. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    /// Restrict to one meal-of-day classification
    pub meal_type: Option<meal::MealType>,
    /// Restrict to one status
    pub status: Option<MealStatus>,
    /// Restrict to one date
    pub date: Option<Date>,
    /// Earliest date to include
    pub start_date: Option<Date>,
    /// Latest date to include
    pub end_date: Option<Date>,
}

/// Parameters for adding an ingredient line to a meal.
#[derive(Debug, Clone)]
pub struct NewIngredient {
    /// Ingredient name
    pub name: String,
    /// Quantity in the given unit
    pub quantity: f64,
    /// Measurement unit
    pub unit: ingredient::IngredientUnit,
    /// Estimated cost in dollars
    pub estimated_cost: f64,
}

/// Creates a meal in `planned` status, owned by the acting member.
pub async fn create_meal(
    db: &DatabaseConnection,
    actor: &member::Model,
    new: NewMeal,
) -> Result<meal::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Meal name cannot be empty".to_string(),
        });
    }
    if !new.estimated_cost.is_finite() || new.estimated_cost <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.estimated_cost,
        });
    }

    let now = chrono::Utc::now();
    let model = meal::ActiveModel {
        name: Set(new.name.trim().to_string()),
        description: Set(new.description),
        meal_type: Set(new.meal_type),
        date: Set(new.date),
        time: Set(new.time),
        estimated_cost: Set(new.estimated_cost),
        actual_cost: Set(None),
        status: Set(MealStatus::Planned),
        created_by: Set(actor.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Retrieves meals matching the filter, newest date and time first.
pub async fn list_meals(db: &DatabaseConnection, filter: &MealFilter) -> Result<Vec<meal::Model>> {
    let mut query = Meal::find();
    if let Some(ref meal_type) = filter.meal_type {
        query = query.filter(meal::Column::MealType.eq(meal_type.clone()));
    }
    if let Some(ref status) = filter.status {
        query = query.filter(meal::Column::Status.eq(status.clone()));
    }
    if let Some(date) = filter.date {
        query = query.filter(meal::Column::Date.eq(date));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(meal::Column::Date.gte(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(meal::Column::Date.lte(end));
    }
    query
        .order_by_desc(meal::Column::Date)
        .order_by_desc(meal::Column::Time)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a meal by its unique ID.
pub async fn get_meal_by_id(db: &DatabaseConnection, meal_id: i64) -> Result<Option<meal::Model>> {
    Meal::find_by_id(meal_id).one(db).await.map_err(Into::into)
}

fn require_meal(meal: Option<meal::Model>, meal_id: i64) -> Result<meal::Model> {
    meal.ok_or_else(|| Error::NotFound {
        entity: "meal",
        id: meal_id.to_string(),
    })
}

/// Applies the given field changes to a meal.
pub async fn update_meal(
    db: &DatabaseConnection,
    meal_id: i64,
    changes: MealChanges,
) -> Result<meal::Model> {
    let meal = require_meal(get_meal_by_id(db, meal_id).await?, meal_id)?;

    if let Some(amount) = changes.estimated_cost {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let mut active: meal::ActiveModel = meal.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(meal_type) = changes.meal_type {
        active.meal_type = Set(meal_type);
    }
    if let Some(date) = changes.date {
        active.date = Set(date);
    }
    if let Some(time) = changes.time {
        active.time = Set(time);
    }
    if let Some(estimated_cost) = changes.estimated_cost {
        active.estimated_cost = Set(estimated_cost);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a meal and its ingredient lines.
pub async fn delete_meal(db: &DatabaseConnection, meal_id: i64) -> Result<()> {
    let meal = require_meal(get_meal_by_id(db, meal_id).await?, meal_id)?;

    let txn = db.begin().await?;
    Ingredient::delete_many()
        .filter(ingredient::Column::MealId.eq(meal_id))
        .exec(&txn)
        .await?;
    let active: meal::ActiveModel = meal.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(())
}

async fn transition(
    db: &DatabaseConnection,
    meal_id: i64,
    allowed_from: &[MealStatus],
    to: MealStatus,
    action: &'static str,
    actual_cost: Option<f64>,
) -> Result<meal::Model> {
    let meal = require_meal(get_meal_by_id(db, meal_id).await?, meal_id)?;

    if !allowed_from.contains(&meal.status) {
        return Err(Error::InvalidTransition {
            entity: "meal",
            status: meal.status.to_value(),
            action,
        });
    }

    let mut active: meal::ActiveModel = meal.into();
    active.status = Set(to);
    if let Some(cost) = actual_cost {
        active.actual_cost = Set(Some(cost));
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Approves a planned meal.
pub async fn approve_meal(db: &DatabaseConnection, meal_id: i64) -> Result<meal::Model> {
    transition(
        db,
        meal_id,
        &[MealStatus::Planned],
        MealStatus::Approved,
        "approve",
        None,
    )
    .await
}

/// Marks an approved meal as prepared, optionally recording its actual cost.
pub async fn complete_meal(
    db: &DatabaseConnection,
    meal_id: i64,
    actual_cost: Option<f64>,
) -> Result<meal::Model> {
    if let Some(amount) = actual_cost {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }
    transition(
        db,
        meal_id,
        &[MealStatus::Approved],
        MealStatus::Prepared,
        "complete",
        actual_cost,
    )
    .await
}

/// Cancels a planned or approved meal.
pub async fn cancel_meal(db: &DatabaseConnection, meal_id: i64) -> Result<meal::Model> {
    transition(
        db,
        meal_id,
        &[MealStatus::Planned, MealStatus::Approved],
        MealStatus::Cancelled,
        "cancel",
        None,
    )
    .await
}

/// Adds an ingredient line to a meal.
pub async fn add_ingredient(
    db: &DatabaseConnection,
    meal_id: i64,
    new: NewIngredient,
) -> Result<ingredient::Model> {
    require_meal(get_meal_by_id(db, meal_id).await?, meal_id)?;

    if new.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Ingredient name cannot be empty".to_string(),
        });
    }
    if !new.quantity.is_finite() || new.quantity <= 0.0 {
        return Err(Error::Validation {
            message: format!("Ingredient quantity must be positive, got {}", new.quantity),
        });
    }
    if !new.estimated_cost.is_finite() || new.estimated_cost <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.estimated_cost,
        });
    }

    let model = ingredient::ActiveModel {
        meal_id: Set(meal_id),
        name: Set(new.name.trim().to_string()),
        quantity: Set(new.quantity),
        unit: Set(new.unit),
        estimated_cost: Set(new.estimated_cost),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Retrieves the ingredient lines of a meal.
pub async fn list_ingredients(
    db: &DatabaseConnection,
    meal_id: i64,
) -> Result<Vec<ingredient::Model>> {
    Ingredient::find()
        .filter(ingredient::Column::MealId.eq(meal_id))
        .order_by_asc(ingredient::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes one ingredient line from a meal.
pub async fn delete_ingredient(
    db: &DatabaseConnection,
    meal_id: i64,
    ingredient_id: i64,
) -> Result<()> {
    let line = Ingredient::find_by_id(ingredient_id)
        .filter(ingredient::Column::MealId.eq(meal_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "ingredient",
            id: ingredient_id.to_string(),
        })?;

    let active: ingredient::ActiveModel = line.into();
    active.delete(db).await?;
    Ok(())
}
