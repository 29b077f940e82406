use clap::Args;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInput {
    pub database: Option<DatabaseInput>,
    pub changelog: Option<ChangelogInput>,
    /// Prefix prepended to every environment variable the config reads
    pub env_prefix: Option<String>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub database: Database,
    pub changelog: ChangelogTable,
}

// Database configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseInput {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub connect_retries: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub target: DatabaseTarget,
    pub connect_retries: u32,
}

/// Where to connect: a full URL, or discrete settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Url(String),
    Settings(ConnectionSettings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub database: String,
}

impl fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseTarget::Url(url) => {
                write!(f, "{}", crate::db::connection::mask_url_password(url))
            }
            DatabaseTarget::Settings(s) => {
                write!(f, "postgres://{}@{}:{}/{}", s.username, s.host, s.port, s.database)
            }
        }
    }
}

// Changelog table configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChangelogInput {
    pub schema: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogTable {
    pub schema: String,
    pub name: String,
}

// CLI argument groups for command-specific options
#[derive(Debug, Clone, Default, Args)]
pub struct DatabaseArgs {
    #[arg(long, help = "Target database URL (overrides the config file and environment)")]
    pub database_url: Option<String>,

    #[arg(long, help = "Schema holding the changelog table")]
    pub changelog_schema: Option<String>,

    #[arg(long, help = "Name of the changelog table")]
    pub changelog_table: Option<String>,
}

impl DatabaseArgs {
    pub fn into_config_input(self, env_prefix: Option<String>) -> ConfigInput {
        let database = self.database_url.map(|url| DatabaseInput {
            url: Some(url),
            ..DatabaseInput::default()
        });

        let changelog = if self.changelog_schema.is_some() || self.changelog_table.is_some() {
            Some(ChangelogInput {
                schema: self.changelog_schema,
                table: self.changelog_table,
            })
        } else {
            None
        };

        ConfigInput {
            database,
            changelog,
            env_prefix,
        }
    }
}
