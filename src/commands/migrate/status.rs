use crate::commands::migrate::open_database;
use crate::config::Config;
use crate::migrate::{ChangesetState, ChangesetStatus, Migrator};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub async fn cmd_migrate_status(config: &Config, file: &Path) -> Result<()> {
    let db = open_database(config).await?;
    println!(
        "Checking {} against {} ({})",
        file.display(),
        db.qualified_table(),
        config.database.target
    );

    let migrator = Migrator::new(db);
    let result = migrator
        .status(file)
        .await
        .with_context(|| format!("Failed to read status of {}", file.display()));

    migrator.database().pool().close().await;
    let statuses = result?;

    print_status(&statuses);
    Ok(())
}

fn print_status(statuses: &[ChangesetStatus]) {
    if statuses.is_empty() {
        println!("No changesets found");
        return;
    }

    for status in statuses {
        let marker = match &status.state {
            ChangesetState::Applied => style("applied ").green(),
            ChangesetState::Pending => style("pending ").yellow(),
            ChangesetState::Modified { .. } => style("modified").red(),
        };
        println!("  {} {} ({})", marker, status.label(), status.key.filename);

        if let ChangesetState::Modified { applied_checksum } = &status.state {
            println!(
                "           applied checksum {}, file checksum {}",
                applied_checksum, status.checksum
            );
        }
    }

    let pending = statuses
        .iter()
        .filter(|s| s.state == ChangesetState::Pending)
        .count();
    let modified = statuses
        .iter()
        .filter(|s| matches!(s.state, ChangesetState::Modified { .. }))
        .count();

    println!(
        "{} changesets: {} applied, {} pending, {} modified",
        statuses.len(),
        statuses.len() - pending - modified,
        pending,
        modified
    );
}
