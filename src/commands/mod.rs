pub mod inspect;
pub mod migrate;

// Re-export all command functions
pub use inspect::{InspectFormat, cmd_inspect};
pub use migrate::{OutputOptions, cmd_migrate_all, cmd_migrate_reset, cmd_migrate_status};
