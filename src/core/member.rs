//! Member business logic - Handles all member-related operations.
//!
//! Provides functions for creating, retrieving, updating, and deleting
//! members, plus the atomic balance update shared by the ledger and
//! settlement paths. All functions are async and return Result types for
//! error handling.

use crate::{
    entities::{
        AuthToken, Budget, Expense, Ingredient, Meal, MealTracking, Member, MonthlyDeposit,
        ShoppingItem, ShoppingList, auth_token, budget, expense, ingredient, meal, meal_tracking,
        member, monthly_deposit, shopping_item, shopping_list,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Parameters for creating a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    /// Login name, must be unique and non-empty
    pub username: String,
    /// Argon2 hash of the password (see `core::auth::hash_password`)
    pub password_hash: String,
    /// Display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Role within the organization
    pub role: member::MemberRole,
    /// Employee or guest classification
    pub member_type: member::MemberType,
    /// Free-form dietary notes
    pub dietary_restrictions: String,
    /// Configured recurring deposit amount
    pub monthly_deposit: f64,
}

/// Optional field changes for updating a member. `None` fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct MemberChanges {
    /// New display name
    pub full_name: Option<String>,
    /// New contact email
    pub email: Option<String>,
    /// New contact phone number
    pub phone: Option<String>,
    /// New role
    pub role: Option<member::MemberRole>,
    /// New account status
    pub status: Option<member::MemberStatus>,
    /// New classification
    pub member_type: Option<member::MemberType>,
    /// New dietary notes
    pub dietary_restrictions: Option<String>,
    /// New recurring deposit amount
    pub monthly_deposit: Option<f64>,
}

/// Filters for listing members. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    /// Restrict to one role
    pub role: Option<member::MemberRole>,
    /// Restrict to one status
    pub status: Option<member::MemberStatus>,
    /// Restrict to one classification
    pub member_type: Option<member::MemberType>,
}

/// Retrieves members matching the filter, newest joiners first.
pub async fn list_members(
    db: &DatabaseConnection,
    filter: &MemberFilter,
) -> Result<Vec<member::Model>> {
    let mut query = Member::find();
    if let Some(ref role) = filter.role {
        query = query.filter(member::Column::Role.eq(role.clone()));
    }
    if let Some(ref status) = filter.status {
        query = query.filter(member::Column::Status.eq(status.clone()));
    }
    if let Some(ref member_type) = filter.member_type {
        query = query.filter(member::Column::MemberType.eq(member_type.clone()));
    }
    query
        .order_by_desc(member::Column::JoinDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by its unique ID.
pub async fn get_member_by_id(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Option<member::Model>> {
    Member::find_by_id(member_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by username.
pub async fn get_member_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<member::Model>> {
    Member::find()
        .filter(member::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new member with an active status and a zero starting balance.
///
/// The username must be non-empty and not already taken; the recurring
/// deposit amount must be non-negative and finite.
pub async fn create_member(db: &DatabaseConnection, new: NewMember) -> Result<member::Model> {
    if new.username.trim().is_empty() {
        return Err(Error::Validation {
            message: "Username cannot be empty".to_string(),
        });
    }

    if !new.monthly_deposit.is_finite() || new.monthly_deposit < 0.0 {
        return Err(Error::InvalidAmount {
            amount: new.monthly_deposit,
        });
    }

    if get_member_by_username(db, new.username.trim()).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Username {} is already taken", new.username.trim()),
        });
    }

    let member = member::ActiveModel {
        username: Set(new.username.trim().to_string()),
        password_hash: Set(new.password_hash),
        full_name: Set(new.full_name),
        email: Set(new.email),
        phone: Set(new.phone),
        role: Set(new.role),
        status: Set(member::MemberStatus::Active),
        member_type: Set(new.member_type),
        dietary_restrictions: Set(new.dietary_restrictions),
        join_date: Set(chrono::Utc::now()),
        monthly_deposit: Set(new.monthly_deposit),
        current_balance: Set(0.0),
        ..Default::default()
    };

    let result = member.insert(db).await?;
    Ok(result)
}

/// Applies the given field changes to a member.
pub async fn update_member(
    db: &DatabaseConnection,
    member_id: i64,
    changes: MemberChanges,
) -> Result<member::Model> {
    let member = get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })?;

    if let Some(amount) = changes.monthly_deposit {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let mut active: member::ActiveModel = member.into();
    if let Some(full_name) = changes.full_name {
        active.full_name = Set(full_name);
    }
    if let Some(email) = changes.email {
        active.email = Set(email);
    }
    if let Some(phone) = changes.phone {
        active.phone = Set(phone);
    }
    if let Some(role) = changes.role {
        active.role = Set(role);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(member_type) = changes.member_type {
        active.member_type = Set(member_type);
    }
    if let Some(dietary_restrictions) = changes.dietary_restrictions {
        active.dietary_restrictions = Set(dietary_restrictions);
    }
    if let Some(monthly_deposit) = changes.monthly_deposit {
        active.monthly_deposit = Set(monthly_deposit);
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes a member and everything hanging off it.
///
/// Deposits, tracking records, tokens, created meals (with their
/// ingredients), shopping lists (with their items), submitted expenses, and
/// budgets cascade; `approved_by` stamps on other members' expenses are
/// nulled out. Everything happens in one transaction.
pub async fn delete_member(db: &DatabaseConnection, member_id: i64) -> Result<()> {
    let member = get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })?;

    let txn = db.begin().await?;

    // Null out approval stamps before cascading deletes
    Expense::update_many()
        .col_expr(expense::Column::ApprovedBy, Expr::value(Option::<i64>::None))
        .filter(expense::Column::ApprovedBy.eq(member_id))
        .exec(&txn)
        .await?;

    Expense::delete_many()
        .filter(expense::Column::SubmittedBy.eq(member_id))
        .exec(&txn)
        .await?;

    Budget::delete_many()
        .filter(budget::Column::CreatedBy.eq(member_id))
        .exec(&txn)
        .await?;

    let list_ids: Vec<i64> = ShoppingList::find()
        .filter(shopping_list::Column::CreatedBy.eq(member_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();
    if !list_ids.is_empty() {
        ShoppingItem::delete_many()
            .filter(shopping_item::Column::ShoppingListId.is_in(list_ids.clone()))
            .exec(&txn)
            .await?;
        ShoppingList::delete_many()
            .filter(shopping_list::Column::Id.is_in(list_ids))
            .exec(&txn)
            .await?;
    }

    let meal_ids: Vec<i64> = Meal::find()
        .filter(meal::Column::CreatedBy.eq(member_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    if !meal_ids.is_empty() {
        Ingredient::delete_many()
            .filter(ingredient::Column::MealId.is_in(meal_ids.clone()))
            .exec(&txn)
            .await?;
        Meal::delete_many()
            .filter(meal::Column::Id.is_in(meal_ids))
            .exec(&txn)
            .await?;
    }

    MealTracking::delete_many()
        .filter(meal_tracking::Column::MemberId.eq(member_id))
        .exec(&txn)
        .await?;
    MonthlyDeposit::delete_many()
        .filter(monthly_deposit::Column::MemberId.eq(member_id))
        .exec(&txn)
        .await?;
    AuthToken::delete_many()
        .filter(auth_token::Column::MemberId.eq(member_id))
        .exec(&txn)
        .await?;

    let active: member::ActiveModel = member.into();
    active.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Updates a member's balance by atomically adding an amount.
///
/// This performs a single database-level `UPDATE members SET current_balance
/// = current_balance + delta WHERE id = ?` instead of a read-modify-write, so
/// concurrent credits and debits cannot lose updates.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `member_id` - ID of the member to update
/// * `amount_delta` - Amount to add to the balance (negative to debit)
///
/// # Returns
/// The updated member model
pub async fn update_member_balance_atomic<C>(
    db: &C,
    member_id: i64,
    amount_delta: f64,
) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    let _member = Member::find_by_id(member_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })?;

    Member::update_many()
        .col_expr(
            member::Column::CurrentBalance,
            Expr::col(member::Column::CurrentBalance).add(amount_delta),
        )
        .filter(member::Column::Id.eq(member_id))
        .exec(db)
        .await?;

    Member::find_by_id(member_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })
}
