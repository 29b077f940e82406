use crate::changelog::ChangelogEntry;
use crate::changeset::parse_file;
use crate::db::Database;
use crate::migrate::{MigrateError, Migrator, Phase, limit_reached};
use std::path::Path;
use tracing::{debug, info};

impl<D: Database> Migrator<D> {
    /// Apply pending changesets from `path` in file order.
    ///
    /// At most `max` changesets are applied (`0` for all). Already applied
    /// changesets are skipped and do not count. Returns how many were applied.
    pub async fn migrate(&self, path: &Path, max: usize) -> Result<usize, MigrateError> {
        self.db
            .ensure_changelog()
            .await
            .map_err(MigrateError::Changelog)?;

        let changesets = parse_file(path)?;
        info!(
            "Parsed {} changesets from {} ({})",
            changesets.len(),
            path.display(),
            self.db.backend()
        );

        let mut applied = 0;

        for changeset in &changesets {
            let label = changeset.label();
            let checksum = changeset.checksum();

            let existing = self
                .db
                .find_checksum(&changeset.key())
                .await
                .map_err(|source| MigrateError::Lookup {
                    label: label.clone(),
                    source,
                })?;

            if let Some(existing) = existing {
                if existing != checksum {
                    return Err(MigrateError::ChecksumMismatch {
                        label,
                        existing,
                        current: checksum,
                    });
                }

                debug!("Changeset {} already applied, skipping", label);
                self.reporter.already_applied(&label);
                continue;
            }

            let statements = changeset.change_statements();
            self.run_script(&label, &statements, Phase::Change).await?;

            let record_err = |source| MigrateError::Record {
                label: label.clone(),
                source,
            };
            let order = self.db.count_entries().await.map_err(record_err)? + 1;
            let entry = ChangelogEntry::for_changeset(changeset, order, &checksum);
            self.db.insert_entry(&entry).await.map_err(record_err)?;

            info!(
                "Applied changeset {} ({} statements, order {})",
                label,
                statements.len(),
                order
            );
            self.reporter.applied(&label);

            applied += 1;
            if limit_reached(applied, max) {
                debug!("Reached limit of {} changesets", max);
                break;
            }
        }

        Ok(applied)
    }
}
