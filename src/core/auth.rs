//! Authentication business logic - Credential lifecycle and token
//! resolution.
//!
//! This is deliberately plain plumbing: passwords are hashed with Argon2,
//! tokens are opaque UUID strings stored in the `auth_tokens` table as
//! access/refresh pairs, and the rest of the crate only ever sees a resolved
//! member model. Core operations take that member explicitly; nothing reads
//! ambient request state.

use crate::{
    core::member,
    entities::{
        AuthToken,
        auth_token::{self, TokenKind},
        member as member_entity,
    },
    errors::{Error, Result},
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::{Set, TransactionTrait, prelude::*};

/// An access token and the refresh token that can renew it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Bearer token sent on requests
    pub access: String,
    /// Token exchanged for a fresh access token
    pub refresh: String,
}

/// Parameters for self-registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Desired login name
    pub username: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone number
    pub phone: String,
}

/// Hashes a password with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Config {
            message: format!("Failed to hash password: {e}"),
        })
}

/// Checks a password against a stored Argon2 hash.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(Error::Validation {
            message: "Password must be at least 8 characters".to_string(),
        });
    }
    Ok(())
}

async fn insert_token<C>(db: &C, member_id: i64, kind: TokenKind) -> Result<String>
where
    C: ConnectionTrait,
{
    let token = uuid::Uuid::new_v4().to_string();
    let model = auth_token::ActiveModel {
        token: Set(token.clone()),
        member_id: Set(member_id),
        kind: Set(kind),
        issued_at: Set(chrono::Utc::now()),
    };
    model.insert(db).await?;
    Ok(token)
}

/// Issues a fresh access/refresh token pair for a member.
pub async fn issue_token_pair(db: &DatabaseConnection, member_id: i64) -> Result<TokenPair> {
    let txn = db.begin().await?;
    let access = insert_token(&txn, member_id, TokenKind::Access).await?;
    let refresh = insert_token(&txn, member_id, TokenKind::Refresh).await?;
    txn.commit().await?;
    Ok(TokenPair { access, refresh })
}

/// Registers a new member and logs them in.
///
/// The member starts with the regular role and employee classification; an
/// admin can reclassify them afterwards through the member resource.
pub async fn register(
    db: &DatabaseConnection,
    registration: Registration,
) -> Result<(member_entity::Model, TokenPair)> {
    validate_password(&registration.password)?;

    let new = member::NewMember {
        username: registration.username,
        password_hash: hash_password(&registration.password)?,
        full_name: registration.full_name,
        email: registration.email,
        phone: registration.phone,
        role: member_entity::MemberRole::Member,
        member_type: member_entity::MemberType::Employee,
        dietary_restrictions: String::new(),
        monthly_deposit: 0.0,
    };

    let created = member::create_member(db, new).await?;
    let tokens = issue_token_pair(db, created.id).await?;
    Ok((created, tokens))
}

/// Verifies credentials and issues a token pair.
///
/// Unknown usernames and wrong passwords fail identically so the response
/// does not leak which usernames exist. Suspended members cannot log in.
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<(member_entity::Model, TokenPair)> {
    let invalid = || Error::Unauthorized {
        message: "Invalid username or password".to_string(),
    };

    let member_model = member::get_member_by_username(db, username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, &member_model.password_hash) {
        return Err(invalid());
    }

    if member_model.status == member_entity::MemberStatus::Suspended {
        return Err(Error::Unauthorized {
            message: "Member account is suspended".to_string(),
        });
    }

    let tokens = issue_token_pair(db, member_model.id).await?;
    Ok((member_model, tokens))
}

/// Revokes every token belonging to a member.
pub async fn logout(db: &DatabaseConnection, member_id: i64) -> Result<()> {
    AuthToken::delete_many()
        .filter(auth_token::Column::MemberId.eq(member_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Exchanges a refresh token for a fresh access token.
///
/// The member's previous access tokens are revoked; the refresh token stays
/// valid until logout.
pub async fn refresh_access_token(
    db: &DatabaseConnection,
    refresh_token: &str,
) -> Result<TokenPair> {
    let stored = AuthToken::find_by_id(refresh_token.to_string())
        .one(db)
        .await?
        .filter(|t| t.kind == TokenKind::Refresh)
        .ok_or_else(|| Error::Unauthorized {
            message: "Invalid refresh token".to_string(),
        })?;

    let txn = db.begin().await?;
    AuthToken::delete_many()
        .filter(auth_token::Column::MemberId.eq(stored.member_id))
        .filter(auth_token::Column::Kind.eq(TokenKind::Access))
        .exec(&txn)
        .await?;
    let access = insert_token(&txn, stored.member_id, TokenKind::Access).await?;
    txn.commit().await?;

    Ok(TokenPair {
        access,
        refresh: stored.token,
    })
}

/// Resolves an access token to its member.
pub async fn resolve_access_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<member_entity::Model> {
    let invalid = || Error::Unauthorized {
        message: "Invalid or expired token".to_string(),
    };

    let stored = AuthToken::find_by_id(token.to_string())
        .one(db)
        .await?
        .filter(|t| t.kind == TokenKind::Access)
        .ok_or_else(invalid)?;

    member::get_member_by_id(db, stored.member_id)
        .await?
        .ok_or_else(invalid)
}

/// Changes a member's password after verifying the current one.
pub async fn change_password(
    db: &DatabaseConnection,
    member_id: i64,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    validate_password(new_password)?;

    let member_model = member::get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })?;

    if !verify_password(old_password, &member_model.password_hash) {
        return Err(Error::Unauthorized {
            message: "Current password is incorrect".to_string(),
        });
    }

    let mut active: member_entity::ActiveModel = member_model.into();
    active.password_hash = Set(hash_password(new_password)?);
    active.update(db).await?;
    Ok(())
}
