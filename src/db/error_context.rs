//! Rich error text for failed changeset statements.

use sqlx::postgres::{PgDatabaseError, PgErrorPosition};

/// Error details extracted from a PostgreSQL error
#[derive(Debug, Clone)]
pub struct SqlErrorContext {
    pub message: String,
    /// Line within the failing statement (from the server's character position)
    pub line_number: Option<usize>,
    pub detail: Option<String>,
    pub hint: Option<String>,
    /// PL/pgSQL or similar call-site context
    pub context: Option<String>,
    /// SQLSTATE, e.g. "42P01" for undefined_table
    pub code: Option<String>,
}

impl SqlErrorContext {
    /// Extract error context from a sqlx error raised while running `statement`
    pub fn from_sqlx_error(error: &sqlx::Error, statement: &str) -> Self {
        if let Some(db_error) = error.as_database_error()
            && let Some(pg_error) = db_error.try_downcast_ref::<PgDatabaseError>()
        {
            let line_number = pg_error
                .position()
                .map(|pos| match pos {
                    PgErrorPosition::Original(p) => p,
                    PgErrorPosition::Internal { position, .. } => position,
                })
                .map(|p| position_to_line(statement, p));

            return Self {
                message: pg_error.message().to_string(),
                line_number,
                detail: pg_error.detail().map(str::to_string),
                hint: pg_error.hint().map(str::to_string),
                context: pg_error.r#where().map(str::to_string),
                code: Some(pg_error.code().to_string()),
            };
        }

        Self {
            message: error.to_string(),
            line_number: None,
            detail: None,
            hint: None,
            context: None,
            code: None,
        }
    }

    /// Single block of text suitable for wrapping into a changeset error
    pub fn describe(&self, statement: &str) -> String {
        let mut msg = self.message.clone();
        if let Some(code) = &self.code {
            msg.push_str(&format!(" (SQLSTATE {})", code));
        }

        if let Some(detail) = &self.detail {
            msg.push_str(&format!("\n  Detail: {}", detail));
        }
        if let Some(hint) = &self.hint {
            msg.push_str(&format!("\n  Hint: {}", hint));
        }
        if let Some(ctx) = &self.context {
            msg.push_str(&format!("\n  Context: {}", ctx));
        }

        if let Some(line) = self.line_number {
            msg.push_str(&format!("\n\n{}", format_line_context(statement, line)));
        }

        msg
    }
}

/// Convert 1-indexed character position to line number
pub fn position_to_line(content: &str, position: usize) -> usize {
    content
        .chars()
        .take(position.saturating_sub(1))
        .filter(|c| *c == '\n')
        .count()
        + 1
}

/// Statement lines around the failing one, the failing line marked with `>`
pub fn format_line_context(content: &str, error_line: usize) -> String {
    const CONTEXT_LINES: usize = 2;

    let lines: Vec<&str> = content.lines().collect();
    let error_idx = error_line.saturating_sub(1);
    let start_idx = error_idx.saturating_sub(CONTEXT_LINES).min(lines.len());
    let end_idx = (error_idx + CONTEXT_LINES + 1).min(lines.len());

    lines[start_idx..end_idx]
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let line_num = start_idx + idx + 1;
            let marker = if line_num == error_line { ">" } else { " " };
            format!("  {} {:4} | {}", marker, line_num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
