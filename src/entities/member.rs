//! Member entity - Represents a person participating in the meal system.
//!
//! Each member carries identity and classification fields plus two money
//! fields: `monthly_deposit` (the configured recurring amount) and
//! `current_balance` (the running prepaid credit). The balance is only ever
//! changed by deposit creation and payment settlement, never by tracking
//! writes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a member within the organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Full administrative access
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Can manage meals, costs, and settlements
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Regular member
    #[sea_orm(string_value = "member")]
    Member,
}

/// Account status of a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Participating normally
    #[sea_orm(string_value = "active")]
    Active,
    /// Temporarily not participating
    #[sea_orm(string_value = "inactive")]
    Inactive,
    /// Barred from participating
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

/// Whether the member is a regular employee or a guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum MemberType {
    /// Regular employee member
    #[sea_orm(string_value = "employee")]
    Employee,
    /// Guest member
    #[sea_orm(string_value = "guest")]
    Guest,
}

/// Member database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the system
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 hash of the member's password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Role within the organization
    pub role: MemberRole,
    /// Account status
    pub status: MemberStatus,
    /// Employee or guest classification
    pub member_type: MemberType,
    /// Free-form dietary notes
    pub dietary_restrictions: String,
    /// When the member joined
    pub join_date: DateTimeUtc,
    /// Configured recurring deposit amount in dollars
    pub monthly_deposit: f64,
    /// Running prepaid credit in dollars
    pub current_balance: f64,
}

/// Defines relationships between Member and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member has many monthly deposits
    #[sea_orm(has_many = "super::monthly_deposit::Entity")]
    Deposits,
    /// One member has many meal tracking records
    #[sea_orm(has_many = "super::meal_tracking::Entity")]
    MealTracking,
    /// One member has many auth tokens
    #[sea_orm(has_many = "super::auth_token::Entity")]
    AuthTokens,
}

impl Related<super::monthly_deposit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposits.def()
    }
}

impl Related<super::meal_tracking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealTracking.def()
    }
}

impl Related<super::auth_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
