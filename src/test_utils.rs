//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    core::{budget, expense, meal, member, shopping},
    entities,
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds member creation parameters with sensible defaults.
///
/// # Defaults
/// * `role`: member
/// * `member_type`: employee
/// * `monthly_deposit`: 100.0
#[must_use]
pub fn test_new_member(username: &str) -> member::NewMember {
    member::NewMember {
        username: username.to_string(),
        password_hash: "test-hash".to_string(),
        full_name: format!("Test {username}"),
        email: format!("{username}@example.com"),
        phone: String::new(),
        role: entities::member::MemberRole::Member,
        member_type: entities::member::MemberType::Employee,
        dietary_restrictions: String::new(),
        monthly_deposit: 100.0,
    }
}

/// Creates a test member with sensible defaults.
pub async fn create_test_member(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::member::Model> {
    member::create_member(db, test_new_member(username)).await
}

/// Sets up a complete test environment with a member.
/// Returns (db, member) for common test scenarios.
pub async fn setup_with_member() -> Result<(DatabaseConnection, entities::member::Model)> {
    let db = setup_test_db().await?;
    let member = create_test_member(&db, "test_member").await?;
    Ok((db, member))
}

/// Builds meal creation parameters with sensible defaults.
///
/// # Defaults
/// * `meal_type`: lunch
/// * `date`: 2024-06-01, `time`: 12:30
/// * `estimated_cost`: 50.0
#[must_use]
pub fn test_new_meal(name: &str) -> meal::NewMeal {
    meal::NewMeal {
        name: name.to_string(),
        description: String::new(),
        meal_type: entities::meal::MealType::Lunch,
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
        time: NaiveTime::from_hms_opt(12, 30, 0).unwrap_or_default(),
        estimated_cost: 50.0,
    }
}

/// Creates a test meal with sensible defaults, owned by `actor`.
pub async fn create_test_meal(
    db: &DatabaseConnection,
    actor: &entities::member::Model,
    name: &str,
) -> Result<entities::meal::Model> {
    meal::create_meal(db, actor, test_new_meal(name)).await
}

/// Builds expense creation parameters with sensible defaults.
///
/// # Defaults
/// * `amount`: 25.0
/// * `category`: groceries
/// * `date`: 2024-06-01
#[must_use]
pub fn test_new_expense(title: &str) -> expense::NewExpense {
    expense::NewExpense {
        title: title.to_string(),
        description: String::new(),
        amount: 25.0,
        category: entities::expense::ExpenseCategory::Groceries,
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
    }
}

/// Creates a test expense with sensible defaults, submitted by `actor`.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    actor: &entities::member::Model,
) -> Result<entities::expense::Model> {
    expense::create_expense(db, actor, test_new_expense("Test expense")).await
}

/// Creates a test shopping list with sensible defaults, owned by `actor`.
pub async fn create_test_shopping_list(
    db: &DatabaseConnection,
    actor: &entities::member::Model,
    name: &str,
) -> Result<entities::shopping_list::Model> {
    shopping::create_shopping_list(
        db,
        actor,
        shopping::NewShoppingList {
            name: name.to_string(),
            date_needed: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap_or_default(),
        },
    )
    .await
}

/// Creates a test budget covering June 2024 with a 100.0 total, owned by
/// `actor`.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    actor: &entities::member::Model,
    name: &str,
) -> Result<entities::budget::Model> {
    budget::create_budget(
        db,
        actor,
        budget::NewBudget {
            name: name.to_string(),
            total_amount: 100.0,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default(),
        },
    )
    .await
}
