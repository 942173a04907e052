// src/process/table.rs
use std::collections::HashSet;
use std::io::Cursor;

use csv::ReaderBuilder;

use crate::process::error::ProcessError;
use crate::process::split::RawSection;

/// One materialized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    /// Section key this table came from; empty for a keyless section.
    pub key: String,
    /// Column names, unique within the table.
    pub columns: Vec<String>,
    /// Data rows; every row has exactly `columns.len()` fields.
    pub rows: Vec<Vec<String>>,
}

/// How a section's first data line is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// First line is data; columns get positional names `0, 1, 2, …`.
    None,
    /// First line supplies the column names.
    Infer,
}

impl HeaderMode {
    /// The `Heading` section is a bare key/value block with no header row;
    /// every other section carries one.
    pub fn for_key(key: Option<&str>) -> Self {
        match key {
            Some("Heading") => HeaderMode::None,
            _ => HeaderMode::Infer,
        }
    }
}

/// Materialize one buffered section as a tab-delimited table.
///
/// Every section, including the final one flushed at end of stream, goes
/// through the same header-mode selection. Ragged rows and duplicated header
/// names are surfaced as errors, never repaired.
pub fn parse_section(section: &RawSection) -> Result<ParsedTable, ProcessError> {
    let key = section.key.clone().unwrap_or_default();
    let mode = HeaderMode::for_key(section.key.as_deref());

    if section.lines.is_empty() {
        return match mode {
            // No header line to consume.
            HeaderMode::Infer => Err(ProcessError::EmptySection { section: key }),
            HeaderMode::None => Ok(ParsedTable {
                key,
                columns: Vec::new(),
                rows: Vec::new(),
            }),
        };
    }

    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(section.lines.join("\n")));
    let mut records = rdr.records();

    let mut columns: Vec<String> = Vec::new();
    if let HeaderMode::Infer = mode {
        match records.next() {
            Some(result) => {
                let header = result.map_err(|e| malformed(&key, &e, 1, 0))?;
                let mut seen = HashSet::new();
                for name in header.iter() {
                    if !seen.insert(name) {
                        return Err(ProcessError::DuplicateColumn {
                            section: key,
                            column: name.to_string(),
                        });
                    }
                    columns.push(name.to_string());
                }
            }
            // Lines present but all blank; nothing to infer from.
            None => return Err(ProcessError::EmptySection { section: key }),
        }
    }

    let header_lines = match mode {
        HeaderMode::Infer => 1,
        HeaderMode::None => 0,
    };
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, result) in records.enumerate() {
        let line = idx + header_lines + 1;
        let record = result.map_err(|e| malformed(&key, &e, line, columns.len()))?;
        if columns.is_empty() {
            // First data row under positional naming establishes the width.
            columns = (0..record.len()).map(|i| i.to_string()).collect();
        }
        if record.len() != columns.len() {
            return Err(ProcessError::MalformedSection {
                section: key,
                line,
                expected: columns.len(),
                found: record.len(),
            });
        }
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(ParsedTable { key, columns, rows })
}

fn malformed(key: &str, err: &csv::Error, fallback_line: usize, expected: usize) -> ProcessError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback_line);
    ProcessError::MalformedSection {
        section: key.to_string(),
        line,
        expected,
        found: 0,
    }
}
