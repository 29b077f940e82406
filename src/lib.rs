//! Changeset-based schema migrations for PostgreSQL.
//!
//! A changelog file holds `--changeset author:id` blocks, each with its own
//! `--rollback` lines, and may pull in other files with `--include`.
//! Applied changesets are recorded in a `databasechangelog` table together
//! with an MD5 of their content, so later edits are detected.

pub mod changelog;
pub mod changeset;
pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod migrate;
pub mod progress;
pub mod prompts;
