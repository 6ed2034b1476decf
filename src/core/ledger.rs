//! Ledger business logic - Records prepaid deposits against member balances.
//!
//! A deposit is the only way credit enters a member's balance. Each member
//! gets at most one deposit per calendar month; the uniqueness check, the
//! insert, and the balance credit all happen inside one transaction so
//! concurrent duplicate attempts cannot both land.

use crate::{
    entities::{MonthlyDeposit, monthly_deposit},
    errors::{Error, Result},
};
use chrono::Datelike;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Filters for listing deposits. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepositFilter {
    /// Restrict to one member
    pub member_id: Option<i64>,
    /// Restrict to one month (any day within it)
    pub month: Option<Date>,
}

/// Normalizes any date to the first day of its month.
fn first_of_month(date: Date) -> Date {
    date.with_day(1).unwrap_or(date)
}

/// Records a deposit for a member in a month and credits the balance.
///
/// The month may be given as any day; it is normalized to the first of the
/// month before the uniqueness check. Fails with
/// [`Error::DuplicateDeposit`] if a deposit already exists for that member
/// and month, with [`Error::InvalidAmount`] for a non-positive amount, and
/// with [`Error::MemberNotFound`] for an unknown member. The insert and the
/// balance credit commit together or not at all.
pub async fn record_deposit(
    db: &DatabaseConnection,
    member_id: i64,
    amount: f64,
    month: Date,
    notes: String,
) -> Result<monthly_deposit::Model> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let month = first_of_month(month);

    let txn = db.begin().await?;

    let existing = MonthlyDeposit::find()
        .filter(monthly_deposit::Column::MemberId.eq(member_id))
        .filter(monthly_deposit::Column::Month.eq(month))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateDeposit { member_id, month });
    }

    let deposit = monthly_deposit::ActiveModel {
        member_id: Set(member_id),
        amount: Set(amount),
        month: Set(month),
        deposit_date: Set(chrono::Utc::now()),
        notes: Set(notes),
        ..Default::default()
    };
    let result = deposit.insert(&txn).await?;

    // Credit the balance inside the same transaction; this also rejects
    // unknown member ids before anything is committed.
    crate::core::member::update_member_balance_atomic(&txn, member_id, amount).await?;

    txn.commit().await?;

    Ok(result)
}

/// Retrieves deposits matching the filter, newest month first.
pub async fn list_deposits(
    db: &DatabaseConnection,
    filter: DepositFilter,
) -> Result<Vec<monthly_deposit::Model>> {
    let mut query = MonthlyDeposit::find();
    if let Some(member_id) = filter.member_id {
        query = query.filter(monthly_deposit::Column::MemberId.eq(member_id));
    }
    if let Some(month) = filter.month {
        query = query.filter(monthly_deposit::Column::Month.eq(first_of_month(month)));
    }
    query
        .order_by_desc(monthly_deposit::Column::Month)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a deposit by its unique ID.
pub async fn get_deposit_by_id(
    db: &DatabaseConnection,
    deposit_id: i64,
) -> Result<Option<monthly_deposit::Model>> {
    MonthlyDeposit::find_by_id(deposit_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes a deposit without reversing the balance credit.
///
/// Deposits are immutable-after-creation records of money that actually
/// moved; removal is an administrative correction and deliberately does not
/// claw the credit back.
pub async fn delete_deposit(db: &DatabaseConnection, deposit_id: i64) -> Result<()> {
    let deposit = get_deposit_by_id(db, deposit_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "deposit",
            id: deposit_id.to_string(),
        })?;

    let active: monthly_deposit::ActiveModel = deposit.into();
    active.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_record_deposit_credits_balance() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        let month = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let deposit = record_deposit(&db, member.id, 150.0, month, String::new()).await?;
        assert_eq!(deposit.amount, 150.0);
        assert_eq!(deposit.month, month);

        let reloaded = crate::core::member::get_member_by_id(&db, member.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.current_balance, 150.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_deposit_normalizes_month() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        let mid_month = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
        let deposit = record_deposit(&db, member.id, 80.0, mid_month, String::new()).await?;
        assert_eq!(deposit.month, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        Ok(())
    }

    #[tokio::test]
    async fn test_record_deposit_duplicate_month_conflicts() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        let month = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        record_deposit(&db, member.id, 100.0, month, String::new()).await?;

        // Same month on a different day must still conflict
        let other_day = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let result = record_deposit(&db, member.id, 50.0, other_day, String::new()).await;
        assert!(matches!(result, Err(Error::DuplicateDeposit { .. })));

        // Balance credited exactly once
        let reloaded = crate::core::member::get_member_by_id(&db, member.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.current_balance, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_deposit_different_months_allowed() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        record_deposit(
            &db,
            member.id,
            100.0,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            String::new(),
        )
        .await?;
        record_deposit(
            &db,
            member.id,
            100.0,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            String::new(),
        )
        .await?;

        let reloaded = crate::core::member::get_member_by_id(&db, member.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.current_balance, 200.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_deposit_rejects_non_positive_amounts() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let month = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = record_deposit(&db, member.id, bad, month, String::new()).await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_record_deposit_unknown_member_rolls_back() -> Result<()> {
        let db = setup_test_db().await?;
        let month = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let result = record_deposit(&db, 999, 100.0, month, String::new()).await;
        assert!(matches!(result, Err(Error::MemberNotFound { .. })));

        // The insert must not have survived the failed transaction
        let deposits = list_deposits(&db, DepositFilter::default()).await?;
        assert!(deposits.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_deposits_filters_by_member() -> Result<()> {
        let db = setup_test_db().await?;
        let month = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let a = create_test_member(&db, "a").await?;
        let b = create_test_member(&db, "b").await?;
        record_deposit(&db, a.id, 100.0, month, String::new()).await?;
        record_deposit(&db, b.id, 60.0, month, String::new()).await?;

        let deposits = list_deposits(
            &db,
            DepositFilter {
                member_id: Some(a.id),
                month: None,
            },
        )
        .await?;
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].member_id, a.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_deposit_keeps_balance() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let month = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let deposit = record_deposit(&db, member.id, 100.0, month, String::new()).await?;
        delete_deposit(&db, deposit.id).await?;

        assert!(get_deposit_by_id(&db, deposit.id).await?.is_none());
        let reloaded = crate::core::member::get_member_by_id(&db, member.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.current_balance, 100.0);

        Ok(())
    }
}
