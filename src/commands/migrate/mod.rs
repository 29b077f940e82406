pub mod apply;
pub mod reset;
pub mod status;

// Re-export all command functions
pub use apply::cmd_migrate_all;
pub use reset::cmd_migrate_reset;
pub use status::cmd_migrate_status;

use crate::config::Config;
use crate::db::PgDatabase;
use crate::db::connection::connect_with_retry;
use anyhow::{Context, Result};

/// Output switches shared by the migrate commands
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Print one line per changeset
    pub verbose: bool,
    /// Suppress the closing summary
    pub quiet: bool,
}

pub(crate) async fn open_database(config: &Config) -> Result<PgDatabase> {
    let pool = connect_with_retry(&config.database.target, config.database.connect_retries)
        .await
        .with_context(|| format!("Failed to connect to {}", config.database.target))?;

    PgDatabase::new(pool, &config.changelog).context("Invalid changelog table configuration")
}
