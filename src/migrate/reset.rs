use crate::changeset::parse_file_to_map;
use crate::db::Database;
use crate::migrate::{MigrateError, Migrator, Phase, limit_reached};
use std::path::Path;
use tracing::{debug, info, warn};

impl<D: Database> Migrator<D> {
    /// Roll back applied changesets, most recently applied first.
    ///
    /// Every changeset in the changelog must still be present in `path`.
    /// At most `max` rollbacks run (`0` for all). Returns how many ran.
    pub async fn reset(&self, path: &Path, max: usize) -> Result<usize, MigrateError> {
        let changesets = parse_file_to_map(path)?;

        self.db
            .ensure_changelog()
            .await
            .map_err(MigrateError::Changelog)?;

        let entries = self
            .db
            .list_entries_desc()
            .await
            .map_err(MigrateError::Changelog)?;

        if entries.is_empty() {
            info!("Changelog is empty, nothing to roll back");
            self.reporter.nothing_to_roll_back();
            return Ok(0);
        }

        let mut rolled_back = 0;

        for entry in &entries {
            let key = entry.key();
            let changeset = changesets
                .get(&key.to_string())
                .ok_or_else(|| MigrateError::MissingChangeset(key.to_string()))?;
            let label = changeset.label();

            let statements = changeset.rollback_statements();
            if statements.is_empty() {
                warn!("Changeset {} has no rollback statements", label);
            }
            self.run_script(&label, &statements, Phase::Rollback).await?;

            self.db
                .delete_entry(&key)
                .await
                .map_err(|source| MigrateError::Unrecord {
                    label: label.clone(),
                    source,
                })?;

            info!(
                "Rolled back changeset {} (order {})",
                label, entry.order_executed
            );
            self.reporter.rollback_applied(&label);

            rolled_back += 1;
            if limit_reached(rolled_back, max) {
                debug!("Reached limit of {} rollbacks", max);
                break;
            }
        }

        Ok(rolled_back)
    }
}
