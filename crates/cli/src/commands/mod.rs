//! Command implementations.
//!
//! Each command loads configuration once through [`Context`], runs one
//! operation and prints its result to stdout as pretty JSON.

pub mod maintenance;
pub mod orders;
pub mod reports;
pub mod seed;

use mongodb::Database;
use serde::Serialize;
use tracing::info;

use quickdrop_ops::OpsConfig;
use quickdrop_ops::db;

/// Configuration and database handle shared by every command.
pub struct Context {
    pub config: OpsConfig,
    pub db: Database,
}

impl Context {
    /// Load configuration from the environment and open the database handle.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the connection
    /// string cannot be parsed.
    pub async fn connect() -> Result<Self, Box<dyn std::error::Error>> {
        let config = OpsConfig::from_env()?;
        let db = db::connect(&config).await?;
        info!(database = %config.database, "Database handle ready");
        Ok(Self { config, db })
    }
}

/// Print a value to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}
