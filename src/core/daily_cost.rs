//! Daily cost allocator business logic.
//!
//! One record per calendar date carries the day's total lunch/dinner cost
//! and participant counts; per-person unit costs are derived from it by
//! `core::costs`. Writing the record fans out synchronously to every
//! tracking row for that date, re-deriving their stored cost fields so the
//! denormalized totals always match the latest allocator state.

use crate::{
    core::costs,
    entities::{DailyMealCost, MealTracking, daily_meal_cost, meal_tracking},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// The cost and participant figures for one date.
#[derive(Debug, Clone, Copy)]
pub struct DailyCostInput {
    /// Total lunch cost in dollars
    pub lunch_cost: f64,
    /// Total dinner cost in dollars
    pub dinner_cost: f64,
    /// Number of lunch participants
    pub lunch_participants: i32,
    /// Number of dinner participants
    pub dinner_participants: i32,
}

fn validate_input(input: DailyCostInput) -> Result<()> {
    for amount in [input.lunch_cost, input.dinner_cost] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }
    if input.lunch_participants < 0 || input.dinner_participants < 0 {
        return Err(Error::Validation {
            message: "Participant counts cannot be negative".to_string(),
        });
    }
    Ok(())
}

/// Creates or updates the single daily cost record for a date.
///
/// After the write, every tracking row for the date is re-derived from the
/// new unit costs and saved, inside the same transaction. This is an
/// explicit fan-out, not lazy recomputation: retroactively editing a day's
/// cost changes the stored cost on every dependent tracking row.
pub async fn set_daily_cost(
    db: &DatabaseConnection,
    date: Date,
    input: DailyCostInput,
) -> Result<daily_meal_cost::Model> {
    validate_input(input)?;

    let txn = db.begin().await?;

    let existing = DailyMealCost::find()
        .filter(daily_meal_cost::Column::Date.eq(date))
        .one(&txn)
        .await?;

    let model = match existing {
        Some(record) => {
            let mut active: daily_meal_cost::ActiveModel = record.into();
            active.lunch_cost = Set(input.lunch_cost);
            active.dinner_cost = Set(input.dinner_cost);
            active.lunch_participants = Set(input.lunch_participants);
            active.dinner_participants = Set(input.dinner_participants);
            active.update(&txn).await?
        }
        None => {
            let active = daily_meal_cost::ActiveModel {
                date: Set(date),
                lunch_cost: Set(input.lunch_cost),
                dinner_cost: Set(input.dinner_cost),
                lunch_participants: Set(input.lunch_participants),
                dinner_participants: Set(input.dinner_participants),
                ..Default::default()
            };
            active.insert(&txn).await?
        }
    };

    rederive_tracking_for_date(&txn, &model).await?;

    txn.commit().await?;
    Ok(model)
}

/// Updates a daily cost record addressed by id, with the same fan-out as
/// [`set_daily_cost`]. The date itself is immutable.
pub async fn update_daily_cost(
    db: &DatabaseConnection,
    daily_cost_id: i64,
    input: DailyCostInput,
) -> Result<daily_meal_cost::Model> {
    validate_input(input)?;

    let txn = db.begin().await?;

    let record = DailyMealCost::find_by_id(daily_cost_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "daily cost",
            id: daily_cost_id.to_string(),
        })?;

    let mut active: daily_meal_cost::ActiveModel = record.into();
    active.lunch_cost = Set(input.lunch_cost);
    active.dinner_cost = Set(input.dinner_cost);
    active.lunch_participants = Set(input.lunch_participants);
    active.dinner_participants = Set(input.dinner_participants);
    let model = active.update(&txn).await?;

    rederive_tracking_for_date(&txn, &model).await?;

    txn.commit().await?;
    Ok(model)
}

/// Re-derives and saves the cost fields of every tracking row for the
/// record's date using its current unit costs.
async fn rederive_tracking_for_date<C>(db: &C, daily: &daily_meal_cost::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let units = costs::unit_costs(Some(daily));

    let rows = MealTracking::find()
        .filter(meal_tracking::Column::Date.eq(daily.date))
        .all(db)
        .await?;

    for row in rows {
        let derived = costs::derive_costs(
            costs::MealCounts {
                lunch: row.lunch_count,
                dinner: row.dinner_count,
            },
            units,
        );
        let mut active: meal_tracking::ActiveModel = row.into();
        active.lunch_cost = Set(derived.lunch_cost);
        active.dinner_cost = Set(derived.dinner_cost);
        active.total_cost = Set(derived.total_cost);
        active.update(db).await?;
    }

    Ok(())
}

/// Finds the daily cost record for a date.
pub async fn get_daily_cost_by_date<C>(db: &C, date: Date) -> Result<Option<daily_meal_cost::Model>>
where
    C: ConnectionTrait,
{
    DailyMealCost::find()
        .filter(daily_meal_cost::Column::Date.eq(date))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a daily cost record by its unique ID.
pub async fn get_daily_cost_by_id(
    db: &DatabaseConnection,
    daily_cost_id: i64,
) -> Result<Option<daily_meal_cost::Model>> {
    DailyMealCost::find_by_id(daily_cost_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves daily cost records, newest date first, optionally windowed.
pub async fn list_daily_costs(
    db: &DatabaseConnection,
    start_date: Option<Date>,
    end_date: Option<Date>,
) -> Result<Vec<daily_meal_cost::Model>> {
    let mut query = DailyMealCost::find();
    if let Some(start) = start_date {
        query = query.filter(daily_meal_cost::Column::Date.gte(start));
    }
    if let Some(end) = end_date {
        query = query.filter(daily_meal_cost::Column::Date.lte(end));
    }
    query
        .order_by_desc(daily_meal_cost::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a daily cost record.
///
/// Tracking rows for the date keep their stored costs; they reflect the
/// allocator state as of their last write, which is the denormalization
/// contract.
pub async fn delete_daily_cost(db: &DatabaseConnection, daily_cost_id: i64) -> Result<()> {
    let record = get_daily_cost_by_id(db, daily_cost_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "daily cost",
            id: daily_cost_id.to_string(),
        })?;

    let active: daily_meal_cost::ActiveModel = record.into();
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

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_set_daily_cost_creates_record() -> Result<()> {
        let db = setup_test_db().await?;

        let model = set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 100.0,
                dinner_cost: 80.0,
                lunch_participants: 4,
                dinner_participants: 2,
            },
        )
        .await?;

        assert_eq!(model.lunch_cost, 100.0);
        assert_eq!(model.dinner_participants, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_daily_cost_updates_single_record() -> Result<()> {
        let db = setup_test_db().await?;

        set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 100.0,
                dinner_cost: 0.0,
                lunch_participants: 4,
                dinner_participants: 0,
            },
        )
        .await?;
        set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 120.0,
                dinner_cost: 0.0,
                lunch_participants: 4,
                dinner_participants: 0,
            },
        )
        .await?;

        let all = list_daily_costs(&db, None, None).await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].lunch_cost, 120.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_daily_cost_rejects_bad_input() -> Result<()> {
        let db = setup_test_db().await?;

        let result = set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: -1.0,
                dinner_cost: 0.0,
                lunch_participants: 0,
                dinner_participants: 0,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 10.0,
                dinner_cost: 0.0,
                lunch_participants: -2,
                dinner_participants: 0,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_fans_out_to_tracking_rows() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 100.0,
                dinner_cost: 0.0,
                lunch_participants: 4,
                dinner_participants: 0,
            },
        )
        .await?;
        let tracking =
            crate::core::tracking::record_tracking(&db, member.id, date(), 2, 0, None).await?;
        assert_eq!(tracking.total_cost, 50.0);

        // Retroactive edit: unit cost becomes 200/4 = 50
        set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 200.0,
                dinner_cost: 0.0,
                lunch_participants: 4,
                dinner_participants: 0,
            },
        )
        .await?;

        let reloaded = crate::core::tracking::get_tracking_by_id(&db, tracking.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.lunch_cost, 100.0);
        assert_eq!(reloaded.total_cost, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_fans_out_to_preexisting_tracking_rows() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        // Tracking recorded before any allocator record: costs are zero
        let tracking =
            crate::core::tracking::record_tracking(&db, member.id, date(), 1, 0, None).await?;
        assert_eq!(tracking.total_cost, 0.0);

        set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 60.0,
                dinner_cost: 0.0,
                lunch_participants: 3,
                dinner_participants: 0,
            },
        )
        .await?;

        let reloaded = crate::core::tracking::get_tracking_by_id(&db, tracking.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.lunch_cost, 20.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_daily_cost_by_id() -> Result<()> {
        let db = setup_test_db().await?;

        let created = set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 10.0,
                dinner_cost: 10.0,
                lunch_participants: 1,
                dinner_participants: 1,
            },
        )
        .await?;

        let updated = update_daily_cost(
            &db,
            created.id,
            DailyCostInput {
                lunch_cost: 30.0,
                dinner_cost: 10.0,
                lunch_participants: 2,
                dinner_participants: 1,
            },
        )
        .await?;
        assert_eq!(updated.lunch_cost, 30.0);
        assert_eq!(updated.date, date());

        let missing = update_daily_cost(
            &db,
            999,
            DailyCostInput {
                lunch_cost: 1.0,
                dinner_cost: 1.0,
                lunch_participants: 1,
                dinner_participants: 1,
            },
        )
        .await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_daily_cost_leaves_tracking_costs() -> Result<()> {
        let (db, member) = setup_with_member().await?;

        let created = set_daily_cost(
            &db,
            date(),
            DailyCostInput {
                lunch_cost: 100.0,
                dinner_cost: 0.0,
                lunch_participants: 4,
                dinner_participants: 0,
            },
        )
        .await?;
        let tracking =
            crate::core::tracking::record_tracking(&db, member.id, date(), 2, 0, None).await?;

        delete_daily_cost(&db, created.id).await?;

        let reloaded = crate::core::tracking::get_tracking_by_id(&db, tracking.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.total_cost, 50.0);

        Ok(())
    }
}
