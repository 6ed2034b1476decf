//! Pure cost derivation for meal tracking.
//!
//! The arithmetic that turns a day's aggregate costs into per-member charges
//! lives here, free of any database handle, so the write paths in
//! `core::daily_cost` and `core::tracking` can share one implementation and
//! the rules are testable in isolation. Unit cost is total cost divided by
//! participant count, flooring to zero when nobody participated; a member's
//! charge is unit cost times units taken, rounded to cents.

use crate::{
    entities::daily_meal_cost,
    errors::{Error, Result},
};

/// How many lunch and dinner units a member took on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealCounts {
    /// Lunch units: 0, 1, or 2
    pub lunch: i32,
    /// Dinner units: 0, 1, or 2
    pub dinner: i32,
}

/// Per-person unit costs for one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCosts {
    /// Dollars per lunch unit
    pub lunch: f64,
    /// Dollars per dinner unit
    pub dinner: f64,
}

impl UnitCosts {
    /// Unit costs when no daily cost record exists for a date.
    pub const ZERO: Self = Self {
        lunch: 0.0,
        dinner: 0.0,
    };
}

/// Derived charge fields for one tracking record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedCosts {
    /// Lunch charge in dollars
    pub lunch_cost: f64,
    /// Dinner charge in dollars
    pub dinner_cost: f64,
    /// Sum of lunch and dinner charges
    pub total_cost: f64,
}

/// Rounds a dollar amount to whole cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Validates that a meal count is 0, 1, or 2.
///
/// # Errors
/// Returns [`Error::InvalidMealCount`] for any other value.
pub fn validate_meal_count(count: i32) -> Result<()> {
    if (0..=2).contains(&count) {
        Ok(())
    } else {
        Err(Error::InvalidMealCount { count })
    }
}

/// Extracts per-person unit costs from a daily cost record.
///
/// A period with zero participants yields a zero unit cost rather than a
/// division fault. `None` (no record for the date) yields all-zero costs.
#[must_use]
pub fn unit_costs(daily: Option<&daily_meal_cost::Model>) -> UnitCosts {
    daily.map_or(UnitCosts::ZERO, |d| UnitCosts {
        lunch: per_person(d.lunch_cost, d.lunch_participants),
        dinner: per_person(d.dinner_cost, d.dinner_participants),
    })
}

fn per_person(cost: f64, participants: i32) -> f64 {
    if participants > 0 {
        cost / f64::from(participants)
    } else {
        0.0
    }
}

/// Derives the charge fields for a tracking record from its counts and the
/// date's unit costs. Each field is rounded to cents.
#[must_use]
pub fn derive_costs(counts: MealCounts, units: UnitCosts) -> DerivedCosts {
    let lunch_cost = round_cents(f64::from(counts.lunch) * units.lunch);
    let dinner_cost = round_cents(f64::from(counts.dinner) * units.dinner);
    DerivedCosts {
        lunch_cost,
        dinner_cost,
        total_cost: round_cents(lunch_cost + dinner_cost),
    }
}
