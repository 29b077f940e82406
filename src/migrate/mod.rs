//! The migration engine: applies changesets in file order and rolls them
//! back newest first, one transaction per changeset.
//!
//! Runs are strictly sequential. Concurrent runs against the same changelog
//! are not coordinated and must be serialised by the caller.

pub mod apply;
pub mod error;
pub mod reset;
pub mod status;

pub use error::MigrateError;
pub use status::{ChangesetState, ChangesetStatus};

use crate::db::Database;
use crate::progress::ChangesetReporter;
use tracing::{debug, warn};

/// Which script of a changeset is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Change,
    Rollback,
}

/// Migration engine bound to one database handle
pub struct Migrator<D: Database> {
    db: D,
    reporter: ChangesetReporter,
}

impl<D: Database> Migrator<D> {
    pub fn new(db: D) -> Self {
        Self {
            db,
            reporter: ChangesetReporter::default(),
        }
    }

    /// Print the per-changeset progress lines
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.reporter = ChangesetReporter::new(verbose);
        self
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    pub fn into_inner(self) -> D {
        self.db
    }

    /// Run `statements` in a single transaction, all or nothing
    async fn run_script(
        &self,
        label: &str,
        statements: &[String],
        phase: Phase,
    ) -> Result<(), MigrateError> {
        let mut tx = self.db.begin().await.map_err(MigrateError::Begin)?;

        for statement in statements {
            debug!("{}: executing {}", label, statement);
            if let Err(cause) = tx.execute(statement).await {
                if let Err(rollback) = tx.rollback().await {
                    return Err(MigrateError::Aborted {
                        label: label.to_string(),
                        cause,
                        rollback,
                    });
                }
                let label = label.to_string();
                return Err(match phase {
                    Phase::Change => MigrateError::Statement {
                        label,
                        source: cause,
                    },
                    Phase::Rollback => MigrateError::RollbackStatement {
                        label,
                        source: cause,
                    },
                });
            }
        }

        if let Err(commit) = tx.commit().await {
            warn!("Commit failed for {}, rolling back", label);
            return Err(match tx.rollback().await {
                Ok(()) => MigrateError::Commit {
                    label: label.to_string(),
                    source: commit,
                },
                Err(rollback) => MigrateError::CommitRollback {
                    label: label.to_string(),
                    commit,
                    rollback,
                },
            });
        }

        Ok(())
    }
}

/// `max == 0` means no limit
fn limit_reached(count: usize, max: usize) -> bool {
    max != 0 && count >= max
}
