use crate::changeset::{Changeset, parse_file};
use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use std::path::Path;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InspectFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON output for piping to jq
    Json,
}

/// One changeset as shown by `inspect`
#[derive(Debug, Serialize)]
pub struct InspectedChangeset {
    pub author: String,
    pub id: String,
    pub filename: String,
    pub checksum: String,
    pub changes: Vec<String>,
    pub rollbacks: Vec<String>,
}

impl From<&Changeset> for InspectedChangeset {
    fn from(changeset: &Changeset) -> Self {
        Self {
            author: changeset.author.clone(),
            id: changeset.id.clone(),
            filename: changeset.filename.clone(),
            checksum: changeset.checksum(),
            changes: changeset.change_statements(),
            rollbacks: changeset.rollback_statements(),
        }
    }
}

/// Parse `file` (following includes) and print the result; no database needed
pub fn cmd_inspect(file: &Path, format: InspectFormat) -> Result<()> {
    let changesets =
        parse_file(file).with_context(|| format!("Failed to parse {}", file.display()))?;
    let inspected: Vec<InspectedChangeset> = changesets.iter().map(Into::into).collect();

    match format {
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&inspected)
                .context("Failed to serialize changesets")?;
            println!("{}", json);
        }
        InspectFormat::Text => print_text(&inspected),
    }

    Ok(())
}

fn print_text(changesets: &[InspectedChangeset]) {
    for cs in changesets {
        println!(
            "{} {}:{} ({})",
            style("changeset").bold(),
            cs.author,
            cs.id,
            cs.filename
        );
        println!("  checksum: {}", cs.checksum);
        for statement in &cs.changes {
            println!("  change:   {}", statement);
        }
        for statement in &cs.rollbacks {
            println!("  rollback: {}", statement);
        }
    }
    println!("{} changesets", changesets.len());
}
