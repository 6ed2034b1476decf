//! Initial member seeding from config.toml.
//!
//! A fresh deployment has no members and therefore nobody who could log in
//! and create one. The members listed in config.toml are inserted on first
//! run (matched by username, so restarting never duplicates them).

use crate::{
    core::{auth, member},
    entities::member as member_entity,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of member configurations to seed
    #[serde(default)]
    pub members: Vec<MemberSeed>,
}

/// Configuration for a single seeded member
#[derive(Debug, Deserialize, Clone)]
pub struct MemberSeed {
    /// Login name
    pub username: String,
    /// Initial password (hashed before storage)
    pub password: String,
    /// Display name
    pub full_name: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Role within the organization
    #[serde(default = "default_role")]
    pub role: member_entity::MemberRole,
    /// Configured recurring deposit amount
    #[serde(default)]
    pub monthly_deposit: f64,
}

fn default_role() -> member_entity::MemberRole {
    member_entity::MemberRole::Member
}

/// Loads the seed configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Inserts every configured member that does not already exist.
pub async fn seed_initial_members(db: &DatabaseConnection, config: &Config) -> Result<()> {
    for seed in &config.members {
        if member::get_member_by_username(db, &seed.username)
            .await?
            .is_some()
        {
            continue;
        }

        member::create_member(
            db,
            member::NewMember {
                username: seed.username.clone(),
                password_hash: auth::hash_password(&seed.password)?,
                full_name: seed.full_name.clone(),
                email: seed.email.clone(),
                phone: String::new(),
                role: seed.role.clone(),
                member_type: member_entity::MemberType::Employee,
                dietary_restrictions: String::new(),
                monthly_deposit: seed.monthly_deposit,
            },
        )
        .await?;
        info!(username = %seed.username, "Seeded initial member");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_parse_member_config() {
        let config = parse(
            r#"
            [[members]]
            username = "admin"
            password = "change-me-now"
            full_name = "Mess Admin"
            role = "admin"
            monthly_deposit = 100.0

            [[members]]
            username = "cook"
            password = "also-change-me"
            full_name = "Head Cook"
        "#,
        );

        assert_eq!(config.members.len(), 2);
        assert_eq!(config.members[0].username, "admin");
        assert_eq!(config.members[0].role, member_entity::MemberRole::Admin);
        assert_eq!(config.members[1].role, member_entity::MemberRole::Member);
        assert_eq!(config.members[1].email, "");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse("");
        assert!(config.members.is_empty());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let config = parse(
            r#"
            [[members]]
            username = "admin"
            password = "change-me-now"
            full_name = "Mess Admin"
            role = "admin"
        "#,
        );

        seed_initial_members(&db, &config).await?;
        seed_initial_members(&db, &config).await?;

        let members =
            member::list_members(&db, &member::MemberFilter::default()).await?;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, member_entity::MemberRole::Admin);

        // The seeded credential works
        assert!(auth::login(&db, "admin", "change-me-now").await.is_ok());

        Ok(())
    }
}
