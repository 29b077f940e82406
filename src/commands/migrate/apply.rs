use crate::commands::migrate::{OutputOptions, open_database};
use crate::config::Config;
use crate::migrate::Migrator;
use crate::progress::ChangesetReporter;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// `migrate all`: apply every pending changeset in `file`, at most `max` (0 = all)
pub async fn cmd_migrate_all(
    config: &Config,
    file: &Path,
    max: usize,
    output: OutputOptions,
) -> Result<()> {
    let db = open_database(config).await?;
    info!(
        "Migrating {} using changelog {}",
        file.display(),
        db.qualified_table()
    );

    let migrator = Migrator::new(db).verbose(output.verbose);
    let started = Instant::now();

    let result = migrator
        .migrate(file, max)
        .await
        .with_context(|| format!("Migration of {} failed", file.display()));

    migrator.database().pool().close().await;
    let applied = result?;

    ChangesetReporter::new(!output.quiet).summary("Applied", applied, started.elapsed());
    Ok(())
}
