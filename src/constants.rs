use std::time::Duration;

// Changeset file directives (matched after trimming the line)
pub const DIRECTIVE_INCLUDE: &str = "--include ";
pub const DIRECTIVE_CHANGESET: &str = "--changeset ";
pub const DIRECTIVE_ROLLBACK: &str = "--rollback ";
pub const COMMENT_PREFIX: &str = "--";

// Values stamped on every parsed changeset and copied into the changelog
pub const CHANGESET_DESCRIPTION: &str = "sql";
pub const CHANGESET_VERSION: &str = "1.0";

// Changelog table defaults
pub const DEFAULT_CHANGELOG_SCHEMA: &str = "public";
pub const DEFAULT_CHANGELOG_TABLE: &str = "databasechangelog";

// Configuration file name
pub const CONFIG_FILENAME: &str = "pgchangeset.yaml";

// Connection handling
pub const CONNECT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(200);
pub const CONNECT_MAX_RETRIES: u32 = 5;
