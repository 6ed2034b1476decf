//! Configuration loading for the server.

/// Database configuration and connection management
pub mod database;

/// Initial member seeding from config.toml
pub mod members;

use crate::errors::Result;

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Database connection URL
    pub database_url: String,
    /// Path to the optional member seed file
    pub seed_path: String,
}

/// Loads the application configuration from environment variables, falling
/// back to local defaults for anything unset.
pub fn load_app_configuration() -> Result<AppConfig> {
    Ok(AppConfig {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        database_url: database::get_database_url(),
        seed_path: std::env::var("SEED_CONFIG").unwrap_or_else(|_| "config.toml".to_string()),
    })
}
