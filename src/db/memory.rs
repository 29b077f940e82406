//! In-process backend that keeps the changelog in memory and records the
//! statements it was asked to run. Used by the engine's tests and by
//! callers that want a dry run without a server.

use crate::changelog::ChangelogEntry;
use crate::changeset::ChangesetKey;
use crate::db::{Database, DbError, DbResult, Transaction};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    changelog_created: bool,
    entries: Vec<ChangelogEntry>,
    /// Statements from committed transactions, in commit order
    committed: Vec<String>,
    /// Statements containing any of these substrings fail
    fail_statements: Vec<String>,
    fail_commit: bool,
    fail_rollback: bool,
}

/// Cloning shares the underlying state
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| DbError::Poisoned)
    }

    /// Make every statement containing `pattern` fail
    pub fn fail_on(&self, pattern: &str) -> DbResult<()> {
        self.lock()?.fail_statements.push(pattern.to_string());
        Ok(())
    }

    pub fn set_fail_commit(&self, fail: bool) -> DbResult<()> {
        self.lock()?.fail_commit = fail;
        Ok(())
    }

    pub fn set_fail_rollback(&self, fail: bool) -> DbResult<()> {
        self.lock()?.fail_rollback = fail;
        Ok(())
    }

    pub fn changelog_created(&self) -> DbResult<bool> {
        Ok(self.lock()?.changelog_created)
    }

    /// Changelog rows in insertion order
    pub fn entries(&self) -> DbResult<Vec<ChangelogEntry>> {
        Ok(self.lock()?.entries.clone())
    }

    pub fn committed_statements(&self) -> DbResult<Vec<String>> {
        Ok(self.lock()?.committed.clone())
    }

    /// Overwrite the stored checksum of an applied changeset
    pub fn set_checksum(&self, key: &ChangesetKey, md5sum: &str) -> DbResult<bool> {
        let mut state = self.lock()?;
        match state.entries.iter_mut().find(|e| &e.key() == key) {
            Some(entry) => {
                entry.md5sum = md5sum.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn require_changelog(state: &MemoryState) -> DbResult<()> {
        if state.changelog_created {
            Ok(())
        } else {
            Err(DbError::Sql(
                "relation \"databasechangelog\" does not exist".to_string(),
            ))
        }
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn ensure_changelog(&self) -> DbResult<()> {
        self.lock()?.changelog_created = true;
        Ok(())
    }

    async fn find_checksum(&self, key: &ChangesetKey) -> DbResult<Option<String>> {
        let state = self.lock()?;
        Self::require_changelog(&state)?;
        Ok(state
            .entries
            .iter()
            .find(|e| &e.key() == key)
            .map(|e| e.md5sum.clone()))
    }

    async fn count_entries(&self) -> DbResult<i64> {
        let state = self.lock()?;
        Self::require_changelog(&state)?;
        Ok(state.entries.len() as i64)
    }

    async fn list_entries_desc(&self) -> DbResult<Vec<ChangelogEntry>> {
        let state = self.lock()?;
        Self::require_changelog(&state)?;
        let mut entries = state.entries.clone();
        entries.sort_by(|a, b| b.order_executed.cmp(&a.order_executed));
        Ok(entries)
    }

    async fn insert_entry(&self, entry: &ChangelogEntry) -> DbResult<()> {
        let mut state = self.lock()?;
        Self::require_changelog(&state)?;
        state.entries.push(entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, key: &ChangesetKey) -> DbResult<()> {
        let mut state = self.lock()?;
        Self::require_changelog(&state)?;
        if let Some(pos) = state.entries.iter().position(|e| &e.key() == key) {
            state.entries.remove(pos);
        }
        Ok(())
    }

    async fn begin(&self) -> DbResult<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
        }))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

struct MemoryTransaction {
    state: Arc<Mutex<MemoryState>>,
    pending: Vec<String>,
}

impl MemoryTransaction {
    fn lock(&self) -> DbResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| DbError::Poisoned)
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        let failing = self
            .lock()?
            .fail_statements
            .iter()
            .find(|pattern| sql.contains(pattern.as_str()))
            .cloned();

        if let Some(pattern) = failing {
            return Err(DbError::Sql(format!(
                "statement rejected (matched '{}'): {}",
                pattern, sql
            )));
        }

        self.pending.push(sql.to_string());
        Ok(())
    }

    async fn commit(&mut self) -> DbResult<()> {
        let mut state = self.state.lock().map_err(|_| DbError::Poisoned)?;
        if state.fail_commit {
            return Err(DbError::Sql("commit rejected".to_string()));
        }
        state.committed.append(&mut self.pending);
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        let fail_rollback = self.lock()?.fail_rollback;
        self.pending.clear();
        if fail_rollback {
            return Err(DbError::Sql("rollback rejected".to_string()));
        }
        Ok(())
    }
}
