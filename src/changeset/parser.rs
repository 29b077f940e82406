use crate::changeset::{Changeset, ParseError};
use crate::constants::{
    CHANGESET_DESCRIPTION, CHANGESET_VERSION, COMMENT_PREFIX, DIRECTIVE_CHANGESET,
    DIRECTIVE_INCLUDE, DIRECTIVE_ROLLBACK,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parse a changeset file, and everything it includes, into file order
pub fn parse_file(path: &Path) -> Result<Vec<Changeset>, ParseError> {
    let mut changesets = Vec::new();
    let mut include_stack = Vec::new();
    parse_path_into(path, &mut changesets, &mut include_stack)?;
    Ok(changesets)
}

/// Parse already-open content; `path` names the file for includes and the
/// `filename` stamped on each changeset
pub fn parse_reader<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Changeset>, ParseError> {
    let mut changesets = Vec::new();
    let mut include_stack = vec![stack_entry(path)];
    parse_lines_into(reader, path, &mut changesets, &mut include_stack)?;
    Ok(changesets)
}

/// Parse a file and index it by `author:id:filename`
pub fn parse_file_to_map(path: &Path) -> Result<HashMap<String, Changeset>, ParseError> {
    let changesets = parse_file(path)?;

    let mut map = HashMap::with_capacity(changesets.len());
    for changeset in changesets {
        match map.entry(changeset.key().to_string()) {
            Entry::Occupied(entry) => {
                return Err(ParseError::DuplicateEntry(entry.key().clone()));
            }
            Entry::Vacant(entry) => {
                entry.insert(changeset);
            }
        }
    }

    Ok(map)
}

fn parse_path_into(
    path: &Path,
    out: &mut Vec<Changeset>,
    include_stack: &mut Vec<PathBuf>,
) -> Result<(), ParseError> {
    let entry = stack_entry(path);
    if include_stack.contains(&entry) {
        return Err(ParseError::IncludeCycle(path.to_path_buf()));
    }

    let file = File::open(path)?;
    include_stack.push(entry);
    parse_lines_into(BufReader::new(file), path, out, include_stack)?;
    include_stack.pop();

    Ok(())
}

fn parse_lines_into<R: BufRead>(
    reader: R,
    path: &Path,
    out: &mut Vec<Changeset>,
    include_stack: &mut Vec<PathBuf>,
) -> Result<(), ParseError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(include) = line.strip_prefix(DIRECTIVE_INCLUDE) {
            let include_path = base_dir.join(include.trim());
            debug!("Including {} from {}", include_path.display(), path.display());
            parse_path_into(&include_path, out, include_stack)?;
            continue;
        }

        if let Some(header) = line.strip_prefix(DIRECTIVE_CHANGESET) {
            let mut changeset = Changeset::default();
            changeset.parse_header(header.trim())?;
            changeset.set_file_info(&filename, CHANGESET_DESCRIPTION, CHANGESET_VERSION);
            out.push(changeset);
            continue;
        }

        if let Some(rollback) = line.strip_prefix(DIRECTIVE_ROLLBACK) {
            // Lines attach to the last changeset of the flattened list,
            // which may have come from an included file
            out.last_mut()
                .ok_or_else(|| invalid_format(path, line_idx))?
                .add_rollback(rollback);
            continue;
        }

        if line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        out.last_mut()
            .ok_or_else(|| invalid_format(path, line_idx))?
            .add_change(line);
    }

    Ok(())
}

fn invalid_format(path: &Path, line_idx: usize) -> ParseError {
    ParseError::InvalidFormat {
        file: path.to_path_buf(),
        line: line_idx + 1,
    }
}

/// Normalised path used for include-cycle detection
fn stack_entry(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
