//! Auth token entity - An opaque bearer token bound to a member.
//!
//! Tokens come in access/refresh pairs. The token string itself is the
//! primary key; there is no cryptographic structure to it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a token grants access directly or refreshes an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Sent as `Authorization: Bearer` on requests
    #[sea_orm(string_value = "access")]
    Access,
    /// Exchanged for a fresh access token
    #[sea_orm(string_value = "refresh")]
    Refresh,
}

/// Auth token database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_tokens")]
pub struct Model {
    /// The opaque token string
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    /// Member this token authenticates
    pub member_id: i64,
    /// Access or refresh
    pub kind: TokenKind,
    /// When the token was issued
    pub issued_at: DateTimeUtc,
}

/// Defines relationships between `AuthToken` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each token belongs to one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
