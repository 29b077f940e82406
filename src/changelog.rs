use crate::changeset::{Changeset, ChangesetKey};
use crate::config::types::ChangelogTable;
use crate::db::DbError;
use chrono::{DateTime, Utc};

/// One row of the changelog table: a changeset that has been applied
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogEntry {
    pub id: String,
    pub author: String,
    pub filename: String,
    pub date_executed: DateTime<Utc>,
    pub order_executed: i64,
    pub md5sum: String,
    pub description: String,
    pub tag: Option<String>,
    pub version: String,
}

impl ChangelogEntry {
    /// Entry recording `changeset` as applied now at position `order_executed`
    pub fn for_changeset(changeset: &Changeset, order_executed: i64, md5sum: &str) -> Self {
        Self {
            id: changeset.id.clone(),
            author: changeset.author.clone(),
            filename: changeset.filename.clone(),
            date_executed: Utc::now(),
            order_executed,
            md5sum: md5sum.to_string(),
            description: changeset.description.clone(),
            tag: None,
            version: changeset.version.clone(),
        }
    }

    pub fn key(&self) -> ChangesetKey {
        ChangesetKey::new(&self.author, &self.id, &self.filename)
    }
}

/// Safely format a schema-qualified table name for SQL queries
/// This prevents SQL injection by properly escaping SQL identifiers
pub fn format_changelog_table_name(table: &ChangelogTable) -> Result<String, DbError> {
    // PostgreSQL identifier rules: letter or underscore first, then
    // letters, digits, underscores and dollar signs
    fn is_valid_sql_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' => {}
            _ => return false,
        }

        chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    }

    if !is_valid_sql_identifier(&table.schema) {
        return Err(DbError::InvalidIdentifier(format!(
            "schema name '{}': must contain only letters, numbers, underscores, and dollar signs, starting with letter or underscore",
            table.schema
        )));
    }

    if !is_valid_sql_identifier(&table.name) {
        return Err(DbError::InvalidIdentifier(format!(
            "table name '{}': must contain only letters, numbers, underscores, and dollar signs, starting with letter or underscore",
            table.name
        )));
    }

    Ok(format!(r#""{}"."{}""#, table.schema, table.name))
}

/// `CREATE TABLE IF NOT EXISTS` statement for the changelog table
pub fn changelog_table_ddl(qualified_name: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id VARCHAR(255) NOT NULL,
            author VARCHAR(255) NOT NULL,
            filename VARCHAR(255) NOT NULL,
            dateexecuted TIMESTAMP WITH TIME ZONE NOT NULL,
            orderexecuted INTEGER NOT NULL,
            md5sum VARCHAR(35),
            description VARCHAR(255),
            tag VARCHAR(255),
            version VARCHAR(20)
        )
        "#,
        qualified_name
    )
}

/// Calculate checksum for changeset content
pub fn calculate_checksum(content: &str) -> String {
    format!("{:x}", md5::compute(content))
}
