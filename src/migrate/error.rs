use crate::changeset::ParseError;
use crate::db::DbError;
use thiserror::Error;

/// Everything that can abort a migrate, reset or status run.
///
/// Labels are `author:id`; changelog keys are `author:id:filename`.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("changelog error - {0}")]
    Changelog(#[source] DbError),

    /// An applied changeset's content changed since it was applied
    #[error(
        "checksum does not match - existing changeset {label} has checksum {existing}, but new changeset has checksum {current}"
    )]
    ChecksumMismatch {
        label: String,
        existing: String,
        current: String,
    },

    #[error("internal error on changeset {label} - {source}")]
    Lookup {
        label: String,
        #[source]
        source: DbError,
    },

    #[error("sql error begin transaction - {0}")]
    Begin(#[source] DbError),

    #[error("sql error on changeset {label} - {source}")]
    Statement {
        label: String,
        #[source]
        source: DbError,
    },

    #[error("sql error on rollback {label} - {source}")]
    RollbackStatement {
        label: String,
        #[source]
        source: DbError,
    },

    /// A statement failed and the transaction could not be rolled back either
    #[error("sql error on {label} - {cause}; rollback also failed - {rollback}")]
    Aborted {
        label: String,
        cause: DbError,
        rollback: DbError,
    },

    #[error("sql error on commit {label} - {source}")]
    Commit {
        label: String,
        #[source]
        source: DbError,
    },

    #[error("sql error on commit rollback {label} - commit failed: {commit}; rollback failed: {rollback}")]
    CommitRollback {
        label: String,
        commit: DbError,
        rollback: DbError,
    },

    #[error("changeset {label} was committed but could not be recorded in the changelog - {source}")]
    Record {
        label: String,
        #[source]
        source: DbError,
    },

    #[error("rollback {label} was committed but its changelog row could not be removed - {source}")]
    Unrecord {
        label: String,
        #[source]
        source: DbError,
    },

    /// The changelog references a changeset the file no longer contains
    #[error("changeset is missing: {0}")]
    MissingChangeset(String),
}
