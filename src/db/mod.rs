//! Database capability interface used by the migration engine.
//!
//! The engine never talks to a driver directly: it needs to run statements
//! inside a transaction and to read and write changelog rows, nothing more.
//! `PgDatabase` implements this on PostgreSQL, `MemoryDatabase` in process.

pub mod connection;
pub mod error_context;
pub mod memory;
pub mod postgres;

pub use memory::MemoryDatabase;
pub use postgres::PgDatabase;

use crate::changelog::ChangelogEntry;
use crate::changeset::ChangesetKey;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a database backend
#[derive(Error, Debug)]
pub enum DbError {
    /// Statement or query failure, with whatever context the backend has
    #[error("{0}")]
    Sql(String),

    #[error("failed to connect to {target}: {message}")]
    Connection { target: String, message: String },

    #[error("invalid changelog {0}")]
    InvalidIdentifier(String),

    #[error("in-memory database state is poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Sql(err.to_string())
    }
}

/// Operations the migration engine needs from a database
#[async_trait]
pub trait Database: Send + Sync {
    /// Create the changelog table if it does not exist
    async fn ensure_changelog(&self) -> DbResult<()>;

    /// Stored checksum for a changeset; `Ok(None)` when it was never applied
    async fn find_checksum(&self, key: &ChangesetKey) -> DbResult<Option<String>>;

    /// Number of rows in the changelog
    async fn count_entries(&self) -> DbResult<i64>;

    /// All changelog rows, most recently applied first
    async fn list_entries_desc(&self) -> DbResult<Vec<ChangelogEntry>>;

    async fn insert_entry(&self, entry: &ChangelogEntry) -> DbResult<()>;

    /// Remove at most one row matching `key`
    async fn delete_entry(&self, key: &ChangesetKey) -> DbResult<()>;

    /// Start a transaction; the caller must finish it with commit or rollback
    async fn begin(&self) -> DbResult<Box<dyn Transaction>>;

    /// Backend identifier for logging
    fn backend(&self) -> &'static str;
}

/// An open transaction
#[async_trait]
pub trait Transaction: Send {
    async fn execute(&mut self, sql: &str) -> DbResult<()>;

    async fn commit(&mut self) -> DbResult<()>;

    /// Usable after a failed commit as well as instead of one
    async fn rollback(&mut self) -> DbResult<()>;
}
