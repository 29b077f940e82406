use crate::config::types::*;
use crate::constants::{CONNECT_MAX_RETRIES, DEFAULT_CHANGELOG_SCHEMA, DEFAULT_CHANGELOG_TABLE};

impl Default for Database {
    fn default() -> Self {
        Self {
            target: DatabaseTarget::Settings(ConnectionSettings::default()),
            connect_retries: CONNECT_MAX_RETRIES,
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: None,
            database: "postgres".to_string(),
        }
    }
}

impl Default for ChangelogTable {
    fn default() -> Self {
        Self {
            schema: DEFAULT_CHANGELOG_SCHEMA.to_string(),
            name: DEFAULT_CHANGELOG_TABLE.to_string(),
        }
    }
}
