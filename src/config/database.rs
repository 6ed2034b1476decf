//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without manual SQL. The composite uniqueness
//! rules that the entities cannot express (one tracking row per member and
//! date, one deposit per member and month) are created as unique indexes
//! alongside the tables.

use crate::entities::{
    AuthToken, Budget, DailyMealCost, Expense, Ingredient, Meal, MealTracking, Member,
    MonthlyDeposit, ShoppingItem, ShoppingList, meal_tracking, monthly_deposit,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};

/// Gets the database URL from the environment or returns the default local
/// `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/mealtab.sqlite".to_string())
}

/// Establishes a connection to the database using the `DATABASE_URL`
/// environment variable, falling back to a local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all tables and unique indexes from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    db.execute(builder.build(&schema.create_table_from_entity(Member)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(MonthlyDeposit)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(DailyMealCost)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(MealTracking)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Meal)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Ingredient)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(ShoppingList)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(ShoppingItem)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Expense)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Budget)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(AuthToken)))
        .await?;

    // One tracking row per (member, date)
    let tracking_unique = Index::create()
        .name("idx_meal_tracking_member_date")
        .table(MealTracking)
        .col(meal_tracking::Column::MemberId)
        .col(meal_tracking::Column::Date)
        .unique()
        .to_owned();
    db.execute(builder.build(&tracking_unique)).await?;

    // One deposit per (member, month)
    let deposit_unique = Index::create()
        .name("idx_monthly_deposit_member_month")
        .table(MonthlyDeposit)
        .col(monthly_deposit::Column::MemberId)
        .col(monthly_deposit::Column::Month)
        .unique()
        .to_owned();
    db.execute(builder.build(&deposit_unique)).await?;

    Ok(())
}
