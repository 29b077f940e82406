use crate::changelog::{ChangelogEntry, changelog_table_ddl, format_changelog_table_name};
use crate::changeset::ChangesetKey;
use crate::config::types::ChangelogTable;
use crate::db::error_context::SqlErrorContext;
use crate::db::{Database, DbError, DbResult, Transaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::{Executor, PgPool, Postgres, Row};
use tracing::debug;

/// PostgreSQL backend over a sqlx pool
pub struct PgDatabase {
    pool: PgPool,
    table: ChangelogTable,
    /// Quoted `"schema"."name"`
    qualified_table: String,
}

impl PgDatabase {
    pub fn new(pool: PgPool, table: &ChangelogTable) -> DbResult<Self> {
        let qualified_table = format_changelog_table_name(table)?;
        Ok(Self {
            pool,
            table: table.clone(),
            qualified_table,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn qualified_table(&self) -> &str {
        &self.qualified_table
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn ensure_changelog(&self) -> DbResult<()> {
        if self.table.schema != "public" {
            sqlx::query(&format!(
                r#"CREATE SCHEMA IF NOT EXISTS "{}""#,
                self.table.schema
            ))
            .execute(&self.pool)
            .await?;
        }

        sqlx::query(&changelog_table_ddl(&self.qualified_table))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_checksum(&self, key: &ChangesetKey) -> DbResult<Option<String>> {
        let checksum: Option<Option<String>> = sqlx::query_scalar(&format!(
            "SELECT md5sum FROM {} WHERE id = $1 AND author = $2 AND filename = $3",
            self.qualified_table
        ))
        .bind(&key.id)
        .bind(&key.author)
        .bind(&key.filename)
        .fetch_optional(&self.pool)
        .await?;

        // A row with a NULL checksum still counts as applied
        Ok(checksum.map(Option::unwrap_or_default))
    }

    async fn count_entries(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.qualified_table))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn list_entries_desc(&self) -> DbResult<Vec<ChangelogEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT id, author, filename, dateexecuted, orderexecuted, md5sum, description, tag, version \
             FROM {} ORDER BY orderexecuted DESC",
            self.qualified_table
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(ChangelogEntry {
                id: row.try_get("id")?,
                author: row.try_get("author")?,
                filename: row.try_get("filename")?,
                date_executed: row.try_get::<DateTime<Utc>, _>("dateexecuted")?,
                order_executed: i64::from(row.try_get::<i32, _>("orderexecuted")?),
                md5sum: row
                    .try_get::<Option<String>, _>("md5sum")?
                    .unwrap_or_default(),
                description: row
                    .try_get::<Option<String>, _>("description")?
                    .unwrap_or_default(),
                tag: row.try_get("tag")?,
                version: row
                    .try_get::<Option<String>, _>("version")?
                    .unwrap_or_default(),
            });
        }

        Ok(entries)
    }

    async fn insert_entry(&self, entry: &ChangelogEntry) -> DbResult<()> {
        let order = i32::try_from(entry.order_executed).map_err(|_| {
            DbError::Sql(format!(
                "orderexecuted {} does not fit the changelog column",
                entry.order_executed
            ))
        })?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, author, filename, dateexecuted, orderexecuted, md5sum, description, tag, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            self.qualified_table
        ))
        .bind(&entry.id)
        .bind(&entry.author)
        .bind(&entry.filename)
        .bind(entry.date_executed)
        .bind(order)
        .bind(&entry.md5sum)
        .bind(&entry.description)
        .bind(&entry.tag)
        .bind(&entry.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_entry(&self, key: &ChangesetKey) -> DbResult<()> {
        // PostgreSQL has no DELETE ... LIMIT; pin a single physical row instead
        sqlx::query(&format!(
            "DELETE FROM {table} WHERE ctid IN (\
                SELECT ctid FROM {table} WHERE id = $1 AND author = $2 AND filename = $3 LIMIT 1\
             )",
            table = self.qualified_table
        ))
        .bind(&key.id)
        .bind(&key.author)
        .bind(&key.filename)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn begin(&self) -> DbResult<Box<dyn Transaction>> {
        let mut conn = self.pool.acquire().await?;
        conn.execute("BEGIN").await?;

        Ok(Box::new(PgTransaction {
            conn,
            finished: false,
        }))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Explicit BEGIN/COMMIT/ROLLBACK on one pooled connection, so that a
/// failed COMMIT can still be followed by a ROLLBACK
struct PgTransaction {
    conn: PoolConnection<Postgres>,
    finished: bool,
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        debug!("Executing statement: {}", sql);
        self.conn
            .execute(sqlx::raw_sql(sql))
            .await
            .map_err(|e| DbError::Sql(SqlErrorContext::from_sqlx_error(&e, sql).describe(sql)))?;
        Ok(())
    }

    async fn commit(&mut self) -> DbResult<()> {
        let result = self.conn.execute("COMMIT").await;
        if result.is_ok() {
            self.finished = true;
        }
        result?;
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        let result = self.conn.execute("ROLLBACK").await;
        if result.is_ok() {
            self.finished = true;
        }
        result?;
        Ok(())
    }
}

impl Drop for PgTransaction {
    fn drop(&mut self) {
        // Never hand a connection with an open transaction back to the pool
        if !self.finished {
            self.conn.close_on_drop();
        }
    }
}
