//! Unified error types and result handling.
//!
//! All fallible operations in the crate return [`Result`]. Core modules
//! construct the domain variants directly; the HTTP layer maps each variant
//! to a status code and a structured JSON body.

use chrono::NaiveDate;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem (missing file, bad TOML, bad env var).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Malformed or out-of-range input.
    #[error("Validation error: {message}")]
    Validation {
        /// Field-level description of the rejected input
        message: String,
    },

    /// A money amount that is zero, negative, or not finite where a positive
    /// amount is required.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A meal count outside the allowed {0, 1, 2} range.
    #[error("Meal count must be 0, 1, or 2, got {count}")]
    InvalidMealCount {
        /// The rejected count
        count: i32,
    },

    /// A member id or username that does not resolve.
    #[error("Member not found: {id}")]
    MemberNotFound {
        /// The id or username that failed to resolve
        id: String,
    },

    /// Any other entity lookup that came up empty.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. "meal" or "expense"
        entity: &'static str,
        /// The id that failed to resolve
        id: String,
    },

    /// A second deposit for the same member and month.
    #[error("Deposit already recorded for member {member_id} in {month}")]
    DuplicateDeposit {
        /// Member the duplicate was attempted for
        member_id: i64,
        /// First day of the month the duplicate was attempted for
        month: NaiveDate,
    },

    /// A status-machine action applied in a state that does not permit it.
    #[error("Cannot {action} a {entity} with status {status}")]
    InvalidTransition {
        /// Entity kind, e.g. "meal" or "expense"
        entity: &'static str,
        /// Current status that rejected the action
        status: String,
        /// The attempted action, e.g. "approve"
        action: &'static str,
    },

    /// Missing, expired, or unresolvable credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the credentials were rejected
        message: String,
    },

    /// Database error from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
