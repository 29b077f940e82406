use crate::config::{merge::Merge, types::*};
use anyhow::{Context, Result};

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    /// Resolve against the process environment
    pub fn resolve(self) -> Result<Config> {
        self.resolve_with_env(|key| std::env::var(key).ok())
    }

    /// Resolve using `env` to look up (already prefixed) variable names
    pub fn resolve_with_env<F>(self, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let prefix = self.config_input.env_prefix.clone().unwrap_or_default();
        let lookup = |name: &str| env(&format!("{}{}", prefix, name));

        Ok(Config {
            database: self.resolve_database(&defaults.database, &lookup)?,
            changelog: self.resolve_changelog(&defaults.changelog),
        })
    }

    fn resolve_database<F>(&self, defaults: &Database, env: &F) -> Result<Database>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_input = self.config_input.database.as_ref();

        let connect_retries = db_input
            .and_then(|d| d.connect_retries)
            .unwrap_or(defaults.connect_retries);

        let url = db_input
            .and_then(|d| d.url.as_ref())
            .cloned()
            .or_else(|| env("DATABASE_URL"));

        if let Some(url) = url {
            return Ok(Database {
                target: DatabaseTarget::Url(url),
                connect_retries,
            });
        }

        let default_settings = match &defaults.target {
            DatabaseTarget::Settings(settings) => settings.clone(),
            DatabaseTarget::Url(_) => ConnectionSettings::default(),
        };

        let port = match db_input.and_then(|d| d.port) {
            Some(port) => port,
            None => match env("DB_PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .with_context(|| format!("Invalid DB_PORT value '{}'", raw))?,
                None => default_settings.port,
            },
        };

        let settings = ConnectionSettings {
            host: db_input
                .and_then(|d| d.host.as_ref())
                .cloned()
                .or_else(|| env("DB_HOSTNAME"))
                .unwrap_or(default_settings.host),
            port,
            username: db_input
                .and_then(|d| d.username.as_ref())
                .cloned()
                .or_else(|| env("DB_USERNAME"))
                .unwrap_or(default_settings.username),
            password: db_input
                .and_then(|d| d.password.as_ref())
                .cloned()
                .or_else(|| env("DB_PASSWORD"))
                .or(default_settings.password),
            database: db_input
                .and_then(|d| d.database.as_ref())
                .cloned()
                .or_else(|| env("DB_DATABASE"))
                .unwrap_or(default_settings.database),
        };

        Ok(Database {
            target: DatabaseTarget::Settings(settings),
            connect_retries,
        })
    }

    fn resolve_changelog(&self, defaults: &ChangelogTable) -> ChangelogTable {
        let changelog_input = self.config_input.changelog.as_ref();

        ChangelogTable {
            schema: changelog_input
                .and_then(|c| c.schema.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.schema.clone()),
            name: changelog_input
                .and_then(|c| c.table.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.name.clone()),
        }
    }
}
