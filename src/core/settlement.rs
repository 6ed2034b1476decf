//! Payment settlement business logic.
//!
//! Settlement moves cost from a member's prepaid balance to the "paid"
//! state on their tracking records. Each record settles in its own
//! transaction: the unpaid flag is re-checked inside it, the balance is
//! debited atomically, and the record is marked paid, so a record can never
//! be debited twice even under concurrent settlement calls. Records whose
//! member cannot cover the cost are left unpaid and stay eligible for a
//! later run.

use crate::{
    core::member,
    entities::{MealTracking, Member, meal_tracking},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::debug;

/// Outcome of one settlement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Records actually debited and marked paid
    pub processed_count: usize,
    /// Unpaid records that were eligible at the start of the pass
    pub total_eligible: usize,
}

/// Settles every unpaid tracking record on a date, in ascending member id
/// order.
///
/// A record is settled only when the member's balance covers its total
/// cost; short balances leave the record unpaid without failing the pass.
/// The pass is idempotent: already-paid records are excluded by the unpaid
/// filter and re-checked inside each per-record transaction, so re-invoking
/// after a partial run never double-debits.
pub async fn process_payments(db: &DatabaseConnection, date: Date) -> Result<SettlementOutcome> {
    let eligible = MealTracking::find()
        .filter(meal_tracking::Column::Date.eq(date))
        .filter(meal_tracking::Column::IsPaid.eq(false))
        .order_by_asc(meal_tracking::Column::MemberId)
        .all(db)
        .await?;

    let total_eligible = eligible.len();
    let mut processed_count = 0;

    for record in eligible {
        let txn = db.begin().await?;

        // Re-read inside the transaction: a concurrent pass may have
        // settled this record since the eligibility query.
        let Some(current) = MealTracking::find_by_id(record.id).one(&txn).await? else {
            continue;
        };
        if current.is_paid {
            continue;
        }

        let Some(owner) = Member::find_by_id(current.member_id).one(&txn).await? else {
            continue;
        };

        if owner.current_balance < current.total_cost {
            debug!(
                member_id = owner.id,
                balance = owner.current_balance,
                cost = current.total_cost,
                "insufficient balance, leaving record unpaid"
            );
            continue;
        }

        member::update_member_balance_atomic(&txn, owner.id, -current.total_cost).await?;

        let mut active: meal_tracking::ActiveModel = current.into();
        active.is_paid = Set(true);
        active.update(&txn).await?;

        txn.commit().await?;
        processed_count += 1;
    }

    Ok(SettlementOutcome {
        processed_count,
        total_eligible,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{daily_cost, daily_cost::DailyCostInput, ledger, tracking},
        test_utils::*,
    };
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    async fn seed_daily_cost(db: &DatabaseConnection) -> Result<()> {
        // Lunch unit cost 25, dinner unit cost 20
        daily_cost::set_daily_cost(
            db,
            date(),
            DailyCostInput {
                lunch_cost: 100.0,
                dinner_cost: 60.0,
                lunch_participants: 4,
                dinner_participants: 3,
            },
        )
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_process_payments_debits_and_marks_paid() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;
        ledger::record_deposit(&db, member.id, 100.0, date(), String::new()).await?;

        let record = tracking::record_tracking(&db, member.id, date(), 2, 1, None).await?;
        assert_eq!(record.total_cost, 70.0);

        let outcome = process_payments(&db, date()).await?;
        assert_eq!(outcome.processed_count, 1);
        assert_eq!(outcome.total_eligible, 1);

        let reloaded = tracking::get_tracking_by_id(&db, record.id).await?.unwrap();
        assert!(reloaded.is_paid);

        let owner = crate::core::member::get_member_by_id(&db, member.id)
            .await?
            .unwrap();
        assert_eq!(owner.current_balance, 30.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_process_payments_insufficient_balance_left_unpaid() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;
        ledger::record_deposit(&db, member.id, 50.0, date(), String::new()).await?;

        let record = tracking::record_tracking(&db, member.id, date(), 2, 1, None).await?;

        let outcome = process_payments(&db, date()).await?;
        assert_eq!(outcome.processed_count, 0);
        assert_eq!(outcome.total_eligible, 1);

        let reloaded = tracking::get_tracking_by_id(&db, record.id).await?.unwrap();
        assert!(!reloaded.is_paid);
        let owner = crate::core::member::get_member_by_id(&db, member.id)
            .await?
            .unwrap();
        assert_eq!(owner.current_balance, 50.0);

        // Topping up makes the record eligible again on a later call
        ledger::record_deposit(
            &db,
            member.id,
            50.0,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            String::new(),
        )
        .await?;
        let outcome = process_payments(&db, date()).await?;
        assert_eq!(outcome.processed_count, 1);

        let reloaded = tracking::get_tracking_by_id(&db, record.id).await?.unwrap();
        assert!(reloaded.is_paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_process_payments_is_idempotent() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;
        ledger::record_deposit(&db, member.id, 100.0, date(), String::new()).await?;
        tracking::record_tracking(&db, member.id, date(), 2, 1, None).await?;

        let first = process_payments(&db, date()).await?;
        assert_eq!(first.processed_count, 1);

        // Paid records are no longer eligible; the balance must not move
        let second = process_payments(&db, date()).await?;
        assert_eq!(second.processed_count, 0);
        assert_eq!(second.total_eligible, 0);

        let owner = crate::core::member::get_member_by_id(&db, member.id)
            .await?
            .unwrap();
        assert_eq!(owner.current_balance, 30.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_process_payments_mixed_balances() -> Result<()> {
        let db = setup_test_db().await?;
        seed_daily_cost(&db).await?;

        let rich = create_test_member(&db, "rich").await?;
        let poor = create_test_member(&db, "poor").await?;
        ledger::record_deposit(&db, rich.id, 200.0, date(), String::new()).await?;

        tracking::record_tracking(&db, rich.id, date(), 2, 0, None).await?;
        tracking::record_tracking(&db, poor.id, date(), 1, 0, None).await?;

        let outcome = process_payments(&db, date()).await?;
        assert_eq!(outcome.processed_count, 1);
        assert_eq!(outcome.total_eligible, 2);

        let unpaid = tracking::list_tracking(
            &db,
            tracking::TrackingFilter {
                is_paid: Some(false),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(unpaid.len(), 1);
        assert_eq!(unpaid[0].member_id, poor.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_process_payments_only_given_date() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;
        ledger::record_deposit(&db, member.id, 100.0, date(), String::new()).await?;

        let other_date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        tracking::record_tracking(&db, member.id, date(), 2, 0, None).await?;
        let other = tracking::record_tracking(&db, member.id, other_date, 1, 0, None).await?;

        let outcome = process_payments(&db, date()).await?;
        assert_eq!(outcome.processed_count, 1);

        let reloaded = tracking::get_tracking_by_id(&db, other.id).await?.unwrap();
        assert!(!reloaded.is_paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_process_payments_empty_date() -> Result<()> {
        let db = setup_test_db().await?;

        let outcome = process_payments(&db, date()).await?;
        assert_eq!(outcome.processed_count, 0);
        assert_eq!(outcome.total_eligible, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_cost_record_settles_without_balance() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        // No daily cost record: total_cost is 0, and a zero balance covers it
        let record = tracking::record_tracking(&db, member.id, date(), 2, 2, None).await?;
        assert_eq!(record.total_cost, 0.0);

        let outcome = process_payments(&db, date()).await?;
        assert_eq!(outcome.processed_count, 1);

        let reloaded = tracking::get_tracking_by_id(&db, record.id).await?.unwrap();
        assert!(reloaded.is_paid);

        Ok(())
    }
}
