//! Dashboard statistics - Aggregated counts and sums for the landing view.
//!
//! Everything is computed from the perspective of a caller-supplied "today"
//! so the numbers are reproducible in tests; the HTTP layer passes the
//! current date.

use crate::{
    core::costs,
    entities::{
        Budget, Expense, Meal, MealTracking, Member, MonthlyDeposit, budget, expense,
        meal, meal_tracking, member, monthly_deposit,
    },
    errors::Result,
};
use chrono::{Datelike, Days, NaiveDate};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;

/// Aggregated dashboard statistics.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// All members
    pub total_members: u64,
    /// Members with active status
    pub active_members: u64,
    /// Members classified as employees
    pub employee_members: u64,
    /// Members classified as guests
    pub guest_members: u64,
    /// Meals dated in the current week up to today
    pub total_meals_this_week: u64,
    /// Meals dated in the current month up to today
    pub total_meals_this_month: u64,
    /// Expenses awaiting a decision
    pub pending_expenses: u64,
    /// Sum of total amounts over budgets active today
    pub total_budget: f64,
    /// Sum of spent amounts over budgets active today
    pub spent_budget: f64,
    /// Spent share of the active budgets, as a percentage
    pub budget_utilization: f64,
    /// Deposits credited for the current month
    pub total_deposits_this_month: f64,
    /// Tracked meal costs dated in the current month up to today
    pub total_meal_costs_this_month: f64,
    /// Five most recently created meals
    pub recent_meals: Vec<meal::Model>,
    /// Five most recently submitted expenses
    pub recent_expenses: Vec<expense::Model>,
    /// Five most recent tracking records by date
    pub recent_meal_tracking: Vec<meal_tracking::Model>,
}

fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

fn week_start(today: NaiveDate) -> NaiveDate {
    let offset = u64::from(today.weekday().num_days_from_monday());
    today.checked_sub_days(Days::new(offset)).unwrap_or(today)
}

fn next_month_start(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

/// Computes the dashboard statistics as of `today`.
pub async fn get_dashboard_stats(db: &DatabaseConnection, today: NaiveDate) -> Result<DashboardStats> {
    let month_start = month_start(today);
    let week_start = week_start(today);
    let next_month = next_month_start(today);

    let total_members = Member::find().count(db).await?;
    let active_members = Member::find()
        .filter(member::Column::Status.eq(member::MemberStatus::Active))
        .count(db)
        .await?;
    let employee_members = Member::find()
        .filter(member::Column::MemberType.eq(member::MemberType::Employee))
        .count(db)
        .await?;
    let guest_members = Member::find()
        .filter(member::Column::MemberType.eq(member::MemberType::Guest))
        .count(db)
        .await?;

    let total_meals_this_week = Meal::find()
        .filter(meal::Column::Date.gte(week_start))
        .filter(meal::Column::Date.lte(today))
        .count(db)
        .await?;
    let total_meals_this_month = Meal::find()
        .filter(meal::Column::Date.gte(month_start))
        .filter(meal::Column::Date.lte(today))
        .count(db)
        .await?;

    let pending_expenses = Expense::find()
        .filter(expense::Column::Status.eq(expense::ExpenseStatus::Pending))
        .count(db)
        .await?;

    let current_budgets = Budget::find()
        .filter(budget::Column::StartDate.lte(today))
        .filter(budget::Column::EndDate.gte(today))
        .all(db)
        .await?;
    let total_budget: f64 = current_budgets.iter().map(|b| b.total_amount).sum();
    let spent_budget: f64 = current_budgets.iter().map(|b| b.spent_amount).sum();
    let budget_utilization = if total_budget > 0.0 {
        (spent_budget / total_budget) * 100.0
    } else {
        0.0
    };

    let deposits = MonthlyDeposit::find()
        .filter(monthly_deposit::Column::Month.gte(month_start))
        .filter(monthly_deposit::Column::Month.lt(next_month))
        .all(db)
        .await?;
    let total_deposits_this_month: f64 = deposits.iter().map(|d| d.amount).sum();

    let tracked = MealTracking::find()
        .filter(meal_tracking::Column::Date.gte(month_start))
        .filter(meal_tracking::Column::Date.lte(today))
        .all(db)
        .await?;
    let total_meal_costs_this_month =
        costs::round_cents(tracked.iter().map(|t| t.total_cost).sum());

    let recent_meals = Meal::find()
        .order_by_desc(meal::Column::CreatedAt)
        .limit(5)
        .all(db)
        .await?;
    let recent_expenses = Expense::find()
        .order_by_desc(expense::Column::CreatedAt)
        .limit(5)
        .all(db)
        .await?;
    let recent_meal_tracking = MealTracking::find()
        .order_by_desc(meal_tracking::Column::Date)
        .limit(5)
        .all(db)
        .await?;

    Ok(DashboardStats {
        total_members,
        active_members,
        employee_members,
        guest_members,
        total_meals_this_week,
        total_meals_this_month,
        pending_expenses,
        total_budget,
        spent_budget,
        budget_utilization,
        total_deposits_this_month,
        total_meal_costs_this_month,
        recent_meals,
        recent_expenses,
        recent_meal_tracking,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{daily_cost, daily_cost::DailyCostInput, ledger, tracking},
        core::member::{MemberChanges, update_member},
        test_utils::*,
    };

    fn today() -> NaiveDate {
        // A Saturday; the week starts Monday June 10
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_empty_database() -> Result<()> {
        let db = setup_test_db().await?;

        let stats = get_dashboard_stats(&db, today()).await?;
        assert_eq!(stats.total_members, 0);
        assert_eq!(stats.total_budget, 0.0);
        assert_eq!(stats.budget_utilization, 0.0);
        assert!(stats.recent_meals.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_member_breakdown() -> Result<()> {
        let db = setup_test_db().await?;

        let _employee = create_test_member(&db, "employee").await?;
        let guest = create_test_member(&db, "guest").await?;
        update_member(
            &db,
            guest.id,
            MemberChanges {
                member_type: Some(member::MemberType::Guest),
                status: Some(member::MemberStatus::Inactive),
                ..Default::default()
            },
        )
        .await?;

        let stats = get_dashboard_stats(&db, today()).await?;
        assert_eq!(stats.total_members, 2);
        assert_eq!(stats.active_members, 1);
        assert_eq!(stats.employee_members, 1);
        assert_eq!(stats.guest_members, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_meal_windows() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        // In week and month
        let mut new = test_new_meal("this week");
        new.date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        crate::core::meal::create_meal(&db, &member, new).await?;

        // Earlier in month, before the week started
        let mut new = test_new_meal("earlier this month");
        new.date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        crate::core::meal::create_meal(&db, &member, new).await?;

        // Next month, excluded from both windows
        let mut new = test_new_meal("future");
        new.date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        crate::core::meal::create_meal(&db, &member, new).await?;

        let stats = get_dashboard_stats(&db, today()).await?;
        assert_eq!(stats.total_meals_this_week, 1);
        assert_eq!(stats.total_meals_this_month, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_money_sums() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        ledger::record_deposit(&db, member.id, 120.0, today(), String::new()).await?;

        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        daily_cost::set_daily_cost(
            &db,
            date,
            DailyCostInput {
                lunch_cost: 50.0,
                dinner_cost: 0.0,
                lunch_participants: 2,
                dinner_participants: 0,
            },
        )
        .await?;
        tracking::record_tracking(&db, member.id, date, 1, 0, None).await?;

        create_test_budget(&db, &member, "June").await?;

        let stats = get_dashboard_stats(&db, today()).await?;
        assert_eq!(stats.total_deposits_this_month, 120.0);
        assert_eq!(stats.total_meal_costs_this_month, 25.0);
        assert_eq!(stats.total_budget, 100.0);
        assert_eq!(stats.spent_budget, 0.0);
        assert_eq!(stats.budget_utilization, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_recent_lists_capped_at_five() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        for i in 0u32..7 {
            let mut new = test_new_meal(&format!("meal {i}"));
            new.date = NaiveDate::from_ymd_opt(2024, 6, 1 + i).unwrap();
            crate::core::meal::create_meal(&db, &member, new).await?;
        }

        let stats = get_dashboard_stats(&db, today()).await?;
        assert_eq!(stats.recent_meals.len(), 5);

        Ok(())
    }
}
