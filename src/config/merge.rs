use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            database: match (self.database, other.database) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some(a), Some(b)) => Some(a.merge_with(b)),
            },
            changelog: match (self.changelog, other.changelog) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some(a), Some(b)) => Some(a.merge_with(b)),
            },
            env_prefix: self.env_prefix.merge(other.env_prefix),
        }
    }
}

impl DatabaseInput {
    pub fn merge_with(self, other: DatabaseInput) -> DatabaseInput {
        DatabaseInput {
            url: other.url.or(self.url),
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            username: other.username.or(self.username),
            password: other.password.or(self.password),
            database: other.database.or(self.database),
            connect_retries: other.connect_retries.or(self.connect_retries),
        }
    }
}

impl ChangelogInput {
    pub fn merge_with(self, other: ChangelogInput) -> ChangelogInput {
        ChangelogInput {
            schema: other.schema.or(self.schema),
            table: other.table.or(self.table),
        }
    }
}
