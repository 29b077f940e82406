use crate::commands::migrate::{OutputOptions, open_database};
use crate::config::Config;
use crate::migrate::Migrator;
use crate::progress::ChangesetReporter;
use crate::prompts::confirm_reset;
use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// `migrate reset`: roll back applied changesets newest first, at most `max` (0 = all)
pub async fn cmd_migrate_reset(
    config: &Config,
    file: &Path,
    max: usize,
    assume_yes: bool,
    output: OutputOptions,
) -> Result<()> {
    if !assume_yes
        && std::io::stdin().is_terminal()
        && !confirm_reset(&config.database.target, max)?
    {
        println!("Reset cancelled");
        return Ok(());
    }

    let db = open_database(config).await?;
    info!(
        "Resetting {} using changelog {}",
        file.display(),
        db.qualified_table()
    );

    let migrator = Migrator::new(db).verbose(output.verbose);
    let started = Instant::now();

    let result = migrator
        .reset(file, max)
        .await
        .with_context(|| format!("Reset of {} failed", file.display()));

    migrator.database().pool().close().await;
    let rolled_back = result?;

    ChangesetReporter::new(!output.quiet).summary(
        "Rolled back",
        rolled_back,
        started.elapsed(),
    );
    Ok(())
}
