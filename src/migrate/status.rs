use crate::changeset::{ChangesetKey, parse_file};
use crate::db::Database;
use crate::migrate::{MigrateError, Migrator};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangesetState {
    Applied,
    Pending,
    /// Applied, but the file content no longer matches the stored checksum
    Modified { applied_checksum: String },
}

/// Where one changeset of the file stands relative to the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesetStatus {
    pub key: ChangesetKey,
    pub checksum: String,
    pub state: ChangesetState,
}

impl ChangesetStatus {
    pub fn label(&self) -> String {
        format!("{}:{}", self.key.author, self.key.id)
    }
}

impl<D: Database> Migrator<D> {
    /// Compare the file against the changelog without executing anything
    pub async fn status(&self, path: &Path) -> Result<Vec<ChangesetStatus>, MigrateError> {
        self.db
            .ensure_changelog()
            .await
            .map_err(MigrateError::Changelog)?;

        let changesets = parse_file(path)?;
        let mut statuses = Vec::with_capacity(changesets.len());

        for changeset in &changesets {
            let key = changeset.key();
            let checksum = changeset.checksum();

            let state = match self.db.find_checksum(&key).await.map_err(|source| {
                MigrateError::Lookup {
                    label: changeset.label(),
                    source,
                }
            })? {
                None => ChangesetState::Pending,
                Some(existing) if existing == checksum => ChangesetState::Applied,
                Some(existing) => ChangesetState::Modified {
                    applied_checksum: existing,
                },
            };

            statuses.push(ChangesetStatus {
                key,
                checksum,
                state,
            });
        }

        Ok(statuses)
    }
}
