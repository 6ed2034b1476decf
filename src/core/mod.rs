//! Core business logic - framework-agnostic operations over the entities.
//!
//! Everything here takes a database connection (or transaction) and, where
//! an acting member matters, that member explicitly. The HTTP layer is a
//! thin shell over these functions.

/// Credential lifecycle and token resolution
pub mod auth;
/// Budget CRUD and derived figures
pub mod budget;
/// Pure cost derivation shared by the allocator and tracking paths
pub mod costs;
/// Daily cost allocator with synchronous fan-out recomputation
pub mod daily_cost;
/// Aggregated dashboard statistics
pub mod dashboard;
/// Expense submission and approval flow
pub mod expense;
/// Monthly deposits and balance credits
pub mod ledger;
/// Planned meals, ingredients, and the meal status machine
pub mod meal;
/// Member CRUD and the atomic balance update
pub mod member;
/// Payment settlement against member balances
pub mod settlement;
/// Shopping lists, purchase marking, and generation from meals
pub mod shopping;
/// Per-member-per-day meal tracking
pub mod tracking;
