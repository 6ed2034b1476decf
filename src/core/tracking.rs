//! Meal tracking business logic - Per-member-per-day consumption records.
//!
//! Every write re-derives the record's cost fields from the current daily
//! cost record for its date (or zeroes them when none exists yet). The bulk
//! path additionally recomputes the allocator's participant counts from all
//! tracking rows on the date after the batch lands.

use crate::{
    core::{costs, daily_cost},
    entities::{MealTracking, Member, meal_tracking},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// One entry in a bulk tracking update.
#[derive(Debug, Clone, Copy)]
pub struct TrackingEntry {
    /// Member the entry applies to
    pub member_id: i64,
    /// Lunch units: 0, 1, or 2
    pub lunch_count: i32,
    /// Dinner units: 0, 1, or 2
    pub dinner_count: i32,
}

/// Outcome of a bulk tracking update.
#[derive(Debug, Clone, Default)]
pub struct BulkTrackingResult {
    /// Number of records created or updated
    pub updated_count: usize,
    /// Member ids that did not resolve and were skipped
    pub skipped_member_ids: Vec<i64>,
}

/// Filters for listing tracking records. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingFilter {
    /// Restrict to one member
    pub member_id: Option<i64>,
    /// Restrict to one date
    pub date: Option<Date>,
    /// Restrict by settlement state
    pub is_paid: Option<bool>,
}

/// Creates or updates the tracking record for `(member, date)`.
///
/// Counts outside {0, 1, 2} fail with [`Error::InvalidMealCount`]; an
/// unknown member fails with [`Error::MemberNotFound`]. The cost fields are
/// derived from the daily cost record for the date at write time, inside
/// the same transaction as the write itself.
pub async fn record_tracking(
    db: &DatabaseConnection,
    member_id: i64,
    date: Date,
    lunch_count: i32,
    dinner_count: i32,
    notes: Option<String>,
) -> Result<meal_tracking::Model> {
    costs::validate_meal_count(lunch_count)?;
    costs::validate_meal_count(dinner_count)?;

    let txn = db.begin().await?;

    let member_exists = Member::find_by_id(member_id).one(&txn).await?.is_some();
    if !member_exists {
        return Err(Error::MemberNotFound {
            id: member_id.to_string(),
        });
    }

    let daily = daily_cost::get_daily_cost_by_date(&txn, date).await?;
    let derived = costs::derive_costs(
        costs::MealCounts {
            lunch: lunch_count,
            dinner: dinner_count,
        },
        costs::unit_costs(daily.as_ref()),
    );

    let existing = MealTracking::find()
        .filter(meal_tracking::Column::MemberId.eq(member_id))
        .filter(meal_tracking::Column::Date.eq(date))
        .one(&txn)
        .await?;

    let model = match existing {
        Some(record) => {
            let mut active: meal_tracking::ActiveModel = record.into();
            active.lunch_count = Set(lunch_count);
            active.dinner_count = Set(dinner_count);
            active.lunch_cost = Set(derived.lunch_cost);
            active.dinner_cost = Set(derived.dinner_cost);
            active.total_cost = Set(derived.total_cost);
            if let Some(notes) = notes {
                active.notes = Set(notes);
            }
            active.update(&txn).await?
        }
        None => {
            let active = meal_tracking::ActiveModel {
                member_id: Set(member_id),
                date: Set(date),
                lunch_count: Set(lunch_count),
                dinner_count: Set(dinner_count),
                lunch_cost: Set(derived.lunch_cost),
                dinner_cost: Set(derived.dinner_cost),
                total_cost: Set(derived.total_cost),
                is_paid: Set(false),
                notes: Set(notes.unwrap_or_default()),
                ..Default::default()
            };
            active.insert(&txn).await?
        }
    };

    txn.commit().await?;
    Ok(model)
}

/// Applies [`record_tracking`] for every entry on one date, then recomputes
/// the allocator's participant counts for that date.
///
/// Entries whose member id does not resolve are skipped and reported in the
/// result; they never abort the batch. Invalid meal counts, by contrast,
/// reject the whole batch before any entry is written. The participant
/// recount covers all tracking rows on the date, not just this batch.
pub async fn bulk_record_tracking(
    db: &DatabaseConnection,
    date: Date,
    entries: &[TrackingEntry],
) -> Result<BulkTrackingResult> {
    for entry in entries {
        costs::validate_meal_count(entry.lunch_count)?;
        costs::validate_meal_count(entry.dinner_count)?;
    }

    let mut result = BulkTrackingResult::default();

    for entry in entries {
        match record_tracking(
            db,
            entry.member_id,
            date,
            entry.lunch_count,
            entry.dinner_count,
            None,
        )
        .await
        {
            Ok(_) => result.updated_count += 1,
            Err(Error::MemberNotFound { .. }) => result.skipped_member_ids.push(entry.member_id),
            Err(e) => return Err(e),
        }
    }

    recount_participants(db, date).await?;

    Ok(result)
}

/// Recomputes the daily cost record's participant counts from the tracking
/// rows on its date. No-op when no daily cost record exists.
///
/// Counts are rows with a non-zero lunch (resp. dinner) count. Concurrent
/// bulk updates race on this write last-write-wins; see DESIGN.md.
pub async fn recount_participants(db: &DatabaseConnection, date: Date) -> Result<()> {
    let Some(daily) = daily_cost::get_daily_cost_by_date(db, date).await? else {
        return Ok(());
    };

    let lunch = MealTracking::find()
        .filter(meal_tracking::Column::Date.eq(date))
        .filter(meal_tracking::Column::LunchCount.gt(0))
        .count(db)
        .await?;
    let dinner = MealTracking::find()
        .filter(meal_tracking::Column::Date.eq(date))
        .filter(meal_tracking::Column::DinnerCount.gt(0))
        .count(db)
        .await?;

    let mut active: crate::entities::daily_meal_cost::ActiveModel = daily.into();
    active.lunch_participants = Set(i32::try_from(lunch).unwrap_or(i32::MAX));
    active.dinner_participants = Set(i32::try_from(dinner).unwrap_or(i32::MAX));
    active.update(db).await?;

    Ok(())
}

/// Updates the counts (and optionally notes) of an existing tracking record
/// addressed by id, re-deriving its costs. Member and date are immutable.
pub async fn update_tracking(
    db: &DatabaseConnection,
    tracking_id: i64,
    lunch_count: i32,
    dinner_count: i32,
    notes: Option<String>,
) -> Result<meal_tracking::Model> {
    let record = get_tracking_by_id(db, tracking_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "tracking record",
            id: tracking_id.to_string(),
        })?;

    record_tracking(db, record.member_id, record.date, lunch_count, dinner_count, notes).await
}

/// Finds a tracking record by its unique ID.
pub async fn get_tracking_by_id(
    db: &DatabaseConnection,
    tracking_id: i64,
) -> Result<Option<meal_tracking::Model>> {
    MealTracking::find_by_id(tracking_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves tracking records matching the filter, newest date first.
pub async fn list_tracking(
    db: &DatabaseConnection,
    filter: TrackingFilter,
) -> Result<Vec<meal_tracking::Model>> {
    let mut query = MealTracking::find();
    if let Some(member_id) = filter.member_id {
        query = query.filter(meal_tracking::Column::MemberId.eq(member_id));
    }
    if let Some(date) = filter.date {
        query = query.filter(meal_tracking::Column::Date.eq(date));
    }
    if let Some(is_paid) = filter.is_paid {
        query = query.filter(meal_tracking::Column::IsPaid.eq(is_paid));
    }
    query
        .order_by_desc(meal_tracking::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a tracking record.
pub async fn delete_tracking(db: &DatabaseConnection, tracking_id: i64) -> Result<()> {
    let record = get_tracking_by_id(db, tracking_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "tracking record",
            id: tracking_id.to_string(),
        })?;

    let active: meal_tracking::ActiveModel = record.into();
    active.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::daily_cost::DailyCostInput, test_utils::*};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    async fn seed_daily_cost(db: &DatabaseConnection) -> Result<()> {
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
    async fn test_record_tracking_derives_costs() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;

        let tracking = record_tracking(&db, member.id, date(), 2, 1, None).await?;
        assert_eq!(tracking.lunch_cost, 50.0);
        assert_eq!(tracking.dinner_cost, 20.0);
        assert_eq!(tracking.total_cost, 70.0);
        assert!(!tracking.is_paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_tracking_without_daily_cost_is_zero() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        let tracking = record_tracking(&db, member.id, date(), 2, 2, None).await?;
        assert_eq!(tracking.lunch_cost, 0.0);
        assert_eq!(tracking.dinner_cost, 0.0);
        assert_eq!(tracking.total_cost, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_tracking_upserts_single_row() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;

        let first = record_tracking(&db, member.id, date(), 1, 0, None).await?;
        let second = record_tracking(&db, member.id, date(), 2, 1, None).await?;
        assert_eq!(first.id, second.id);

        let rows = list_tracking(
            &db,
            TrackingFilter {
                date: Some(date()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lunch_count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_tracking_resave_is_idempotent() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;

        let first = record_tracking(&db, member.id, date(), 2, 1, None).await?;
        let resaved = record_tracking(&db, member.id, date(), 2, 1, None).await?;

        assert_eq!(first.lunch_cost, resaved.lunch_cost);
        assert_eq!(first.dinner_cost, resaved.dinner_cost);
        assert_eq!(first.total_cost, resaved.total_cost);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_tracking_rejects_bad_counts() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        for (lunch, dinner) in [(3, 0), (0, 3), (-1, 0), (0, 7)] {
            let result = record_tracking(&db, member.id, date(), lunch, dinner, None).await;
            assert!(matches!(result, Err(Error::InvalidMealCount { .. })));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_record_tracking_unknown_member() -> Result<()> {
        let db = setup_test_db().await?;

        let result = record_tracking(&db, 999, date(), 1, 1, None).await;
        assert!(matches!(result, Err(Error::MemberNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_skips_unknown_members() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_member(&db, "a").await?;
        let b = create_test_member(&db, "b").await?;

        let entries = [
            TrackingEntry {
                member_id: a.id,
                lunch_count: 1,
                dinner_count: 0,
            },
            TrackingEntry {
                member_id: 999,
                lunch_count: 2,
                dinner_count: 2,
            },
            TrackingEntry {
                member_id: b.id,
                lunch_count: 0,
                dinner_count: 1,
            },
        ];

        let result = bulk_record_tracking(&db, date(), &entries).await?;
        assert_eq!(result.updated_count, 2);
        assert_eq!(result.skipped_member_ids, vec![999]);

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_invalid_count_rejects_whole_batch() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        let entries = [
            TrackingEntry {
                member_id: member.id,
                lunch_count: 1,
                dinner_count: 0,
            },
            TrackingEntry {
                member_id: member.id,
                lunch_count: 5,
                dinner_count: 0,
            },
        ];

        let result = bulk_record_tracking(&db, date(), &entries).await;
        assert!(matches!(result, Err(Error::InvalidMealCount { count: 5 })));

        // Nothing was written
        let rows = list_tracking(&db, TrackingFilter::default()).await?;
        assert!(rows.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_recounts_participants_across_all_rows() -> Result<()> {
        let db = setup_test_db().await?;
        seed_daily_cost(&db).await?;

        let a = create_test_member(&db, "a").await?;
        let b = create_test_member(&db, "b").await?;
        let c = create_test_member(&db, "c").await?;

        // A row from an earlier, separate write on the same date
        record_tracking(&db, c.id, date(), 2, 0, None).await?;

        let entries = [
            TrackingEntry {
                member_id: a.id,
                lunch_count: 1,
                dinner_count: 1,
            },
            TrackingEntry {
                member_id: b.id,
                lunch_count: 0,
                dinner_count: 1,
            },
        ];
        bulk_record_tracking(&db, date(), &entries).await?;

        let daily = daily_cost::get_daily_cost_by_date(&db, date()).await?.unwrap();
        // Lunch: a and c; dinner: a and b
        assert_eq!(daily.lunch_participants, 2);
        assert_eq!(daily.dinner_participants, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_without_daily_cost_skips_recount() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        let entries = [TrackingEntry {
            member_id: member.id,
            lunch_count: 1,
            dinner_count: 0,
        }];
        let result = bulk_record_tracking(&db, date(), &entries).await?;
        assert_eq!(result.updated_count, 1);

        assert!(daily_cost::get_daily_cost_by_date(&db, date()).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_tracking_rederives() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        seed_daily_cost(&db).await?;

        let tracking = record_tracking(&db, member.id, date(), 1, 0, None).await?;
        assert_eq!(tracking.total_cost, 25.0);

        let updated = update_tracking(&db, tracking.id, 2, 1, None).await?;
        assert_eq!(updated.total_cost, 70.0);

        let missing = update_tracking(&db, 999, 1, 1, None).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_tracking_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_member(&db, "a").await?;
        let b = create_test_member(&db, "b").await?;

        record_tracking(&db, a.id, date(), 1, 0, None).await?;
        record_tracking(&db, b.id, date(), 0, 1, None).await?;

        let only_a = list_tracking(
            &db,
            TrackingFilter {
                member_id: Some(a.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].member_id, a.id);

        let unpaid = list_tracking(
            &db,
            TrackingFilter {
                is_paid: Some(false),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(unpaid.len(), 2);

        Ok(())
    }
}
