//! Migrate command implementation

use crate::app::services::airport_repository::PgAirportRepository;
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use tracing::info;

/// Create the PostgreSQL schema; requires a configured database URL
pub async fn run_migrate(config: Config) -> Result<()> {
    let url = config.database.url.as_deref().ok_or_else(|| {
        Error::configuration("Migrate requires a database URL (--database-url or DATABASE_URL)")
    })?;

    let repository = PgAirportRepository::connect(url, config.database.max_connections).await?;
    repository.ensure_schema().await?;

    info!("Airport schema is up to date");
    println!("{}", "Airport schema is up to date".green());
    Ok(())
}
