//! In-memory model of one migration unit from a changeset file.

pub mod error;
pub mod parser;

pub use error::ParseError;
pub use parser::{parse_file, parse_file_to_map, parse_reader};

use crate::changelog::calculate_checksum;
use std::fmt;

/// Identity of a changeset as recorded in the changelog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangesetKey {
    pub author: String,
    pub id: String,
    pub filename: String,
}

impl ChangesetKey {
    pub fn new(author: &str, id: &str, filename: &str) -> Self {
        Self {
            author: author.to_string(),
            id: id.to_string(),
            filename: filename.to_string(),
        }
    }
}

impl fmt::Display for ChangesetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.author, self.id, self.filename)
    }
}

/// A single `--changeset author:id` block and the lines that follow it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub id: String,
    pub author: String,
    pub filename: String,
    pub description: String,
    pub version: String,
    change: Vec<String>,
    rollback: Vec<String>,
}

impl Changeset {
    /// Parse the `author:id` part of a header line
    pub fn parse_header(&mut self, line: &str) -> Result<(), ParseError> {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 2 {
            return Err(ParseError::InvalidHeader(line.to_string()));
        }

        let (author, id) = (parts[0].trim(), parts[1].trim());
        if author.is_empty() || id.is_empty() {
            return Err(ParseError::InvalidHeader(line.to_string()));
        }

        self.author = author.to_string();
        self.id = id.to_string();
        Ok(())
    }

    pub fn set_file_info(&mut self, filename: &str, description: &str, version: &str) {
        self.filename = filename.to_string();
        self.description = description.to_string();
        self.version = version.to_string();
    }

    pub fn add_change(&mut self, line: &str) {
        self.change.push(line.to_string());
    }

    pub fn add_rollback(&mut self, line: &str) {
        self.rollback.push(line.to_string());
    }

    /// Forward script, one source line per line
    pub fn changes(&self) -> String {
        self.change.join("\n")
    }

    /// Rollback script, one source line per line
    pub fn rollbacks(&self) -> String {
        self.rollback.join("\n")
    }

    /// Statements to execute when applying, split on bare `;`
    ///
    /// A `;` inside a string literal also splits; changeset files must not
    /// rely on one.
    pub fn change_statements(&self) -> Vec<String> {
        split_statements(&self.changes())
    }

    pub fn rollback_statements(&self) -> Vec<String> {
        split_statements(&self.rollbacks())
    }

    /// MD5 of the forward script; stable across parses of unmodified content
    pub fn checksum(&self) -> String {
        calculate_checksum(&self.changes())
    }

    pub fn key(&self) -> ChangesetKey {
        ChangesetKey::new(&self.author, &self.id, &self.filename)
    }

    /// `author:id`, the form used in progress output
    pub fn label(&self) -> String {
        format!("{}:{}", self.author, self.id)
    }
}

fn split_statements(script: &str) -> Vec<String> {
    script
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}
