//! Work-item loading from a CSV table.
//!
//! The table must carry a header row with a `user_id` column; every other
//! column is kept as an opaque pass-through field. Row order is preserved —
//! it determines the order tasks are launched in, nothing more.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

/// Name of the required identifier column.
const ID_COLUMN: &str = "user_id";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read work-item table: {0}")]
    Io(#[from] std::io::Error),

    #[error("work-item table is empty (no header row)")]
    Empty,

    #[error("duplicate column in header: {column}")]
    DuplicateColumn { column: String },

    #[error("work-item table has no {column} column")]
    MissingIdColumn { column: String },

    #[error("row {line} has {found} fields, header has {expected}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {line} has a blank user_id")]
    BlankId { line: usize },
}

/// One unit of input driving one fetch task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: String,
    /// Remaining columns from the row, keyed by header name.
    pub extra: BTreeMap<String, String>,
}

/// Loads work items from the CSV table at `path`, preserving row order.
pub fn load_work_items(path: &Path) -> Result<Vec<WorkItem>, SourceError> {
    let contents = std::fs::read_to_string(path)?;
    parse_work_items(&contents)
}

fn parse_work_items(contents: &str) -> Result<Vec<WorkItem>, SourceError> {
    let mut lines = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(SourceError::Empty)?;
    let header = split_record(header_line);

    let mut seen = std::collections::HashSet::new();
    for column in &header {
        if !seen.insert(column.as_str()) {
            return Err(SourceError::DuplicateColumn {
                column: column.clone(),
            });
        }
    }

    let id_index = header
        .iter()
        .position(|c| c == ID_COLUMN)
        .ok_or_else(|| SourceError::MissingIdColumn {
            column: ID_COLUMN.to_string(),
        })?;

    let mut items = Vec::new();
    for (index, line) in lines {
        let fields = split_record(line);
        if fields.len() != header.len() {
            return Err(SourceError::RowWidth {
                line: index + 1,
                expected: header.len(),
                found: fields.len(),
            });
        }

        let id = fields[id_index].trim().to_string();
        if id.is_empty() {
            return Err(SourceError::BlankId { line: index + 1 });
        }

        let extra: BTreeMap<String, String> = header
            .iter()
            .zip(fields.iter())
            .filter(|(column, _)| column.as_str() != ID_COLUMN)
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();

        items.push(WorkItem { id, extra });
    }

    Ok(items)
}

/// Splits one CSV record into fields. Double quotes wrap fields containing
/// commas; `""` inside a quoted field is an escaped quote.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}
