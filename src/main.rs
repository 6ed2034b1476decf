use dotenvy::dotenv;
use mealtab::{config, errors::Result, http};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()?;
    info!("Loaded application configuration");

    // 4. Connect and create tables
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established"))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready"))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed initial members when a seed file is present
    match config::members::load_config(&app_config.seed_path) {
        Ok(seed) => {
            config::members::seed_initial_members(&db, &seed)
                .await
                .inspect_err(|e| error!("Failed to seed members: {e}"))?;
        }
        Err(e) => warn!("No member seed applied ({e})"),
    }

    // 6. Serve requests until shutdown
    http::serve(http::AppState { db }, &app_config.bind_addr).await?;

    Ok(())
}
