use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a changeset file tree
#[derive(Error, Debug)]
pub enum ParseError {
    /// A `--changeset` header that is not exactly `author:id`
    #[error("invalid changeset header: '{0}'")]
    InvalidHeader(String),

    /// SQL or a rollback appearing before any changeset was opened
    #[error("invalid changeset format: {} line {line} has content before any --changeset header", file.display())]
    InvalidFormat { file: PathBuf, line: usize },

    /// Two changesets share the same `author:id:filename` key
    #[error("Duplicate entry found: {0}")]
    DuplicateEntry(String),

    #[error("include cycle detected: {} is already being parsed", .0.display())]
    IncludeCycle(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn is_invalid_header(&self) -> bool {
        matches!(self, ParseError::InvalidHeader(_))
    }

    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ParseError::InvalidFormat { .. })
    }
}
