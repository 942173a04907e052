// src/process/write.rs
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::process::error::ProcessError;
use crate::process::table::ParsedTable;

/// Annotation columns dropped from the trimmed `Probes` output.
pub static PROBE_TRIM_COLUMNS: &[&str] = &[
    "Definition",
    "Ontology_Component",
    "Ontology_Process",
    "Ontology_Function",
    "Synonyms",
    "Obsolete_Probe_Id",
    "Probe_Sequence",
];

/// Files a fan-out pass produced, plus projections it had to skip.
#[derive(Debug, Default)]
pub struct WrittenOutputs {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<ProcessError>,
}

/// Project the `Probes` table down to its identifier columns by dropping the
/// fixed annotation set. The projection is declarative: every drop column
/// must be present, otherwise the first absent one is reported.
pub fn trim_probes(table: &ParsedTable) -> Result<ParsedTable, ProcessError> {
    for column in PROBE_TRIM_COLUMNS {
        if !table.columns.iter().any(|c| c == column) {
            return Err(ProcessError::MissingColumn {
                table: table.key.clone(),
                column: column.to_string(),
            });
        }
    }

    let keep: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !PROBE_TRIM_COLUMNS.contains(&c.as_str()))
        .map(|(i, _)| i)
        .collect();

    Ok(ParsedTable {
        key: table.key.clone(),
        columns: keep.iter().map(|&i| table.columns[i].clone()).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect(),
    })
}

/// Write every table of one archive member into `dest_dir` as
/// `{folder_name}_{key}.tsv`, with the `Probes` table additionally fanned out
/// to `{folder_name}_Probes_trimmed.tsv`. A failed trim projection is fatal
/// for that output only: it is logged and recorded, and the remaining
/// outputs still go out.
pub fn write_tables(
    dest_dir: &Path,
    folder_name: &str,
    tables: &[ParsedTable],
) -> Result<WrittenOutputs> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("creating destination folder {}", dest_dir.display()))?;

    let mut out = WrittenOutputs::default();
    for table in tables {
        let path = dest_dir.join(format!("{folder_name}_{}.tsv", table.key));
        write_table(&path, table)?;
        debug!(path = %path.display(), rows = table.rows.len(), "wrote table");
        out.files.push(path);

        if table.key == "Probes" {
            match trim_probes(table) {
                Ok(trimmed) => {
                    let path = dest_dir.join(format!("{folder_name}_{}_trimmed.tsv", table.key));
                    write_table(&path, &trimmed)?;
                    debug!(path = %path.display(), "wrote trimmed table");
                    out.files.push(path);
                }
                Err(e) => {
                    error!(folder = folder_name, "trim projection skipped: {e}");
                    out.skipped.push(e);
                }
            }
        }
    }
    Ok(out)
}

/// Write one table as a tab-delimited file, header row first. The bytes land
/// in a temporary file in the same directory and are renamed into place, so
/// `path` is either fully written or not created; an existing file is
/// overwritten silently.
fn write_table(path: &Path, table: &ParsedTable) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(tmp.as_file());
        if !table.columns.is_empty() {
            writer.write_record(&table.columns)?;
            for row in &table.rows {
                writer.write_record(row)?;
            }
        }
        writer.flush()?;
    }
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("persisting {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::split::RawSection;
    use crate::process::table::parse_section;
    use tempfile::tempdir;

    fn probes_table() -> ParsedTable {
        let mut columns = vec!["ID".to_string()];
        columns.extend(PROBE_TRIM_COLUMNS.iter().map(|c| c.to_string()));
        let rows = vec![(0..columns.len()).map(|i| format!("v{i}")).collect()];
        ParsedTable {
            key: "Probes".to_string(),
            columns,
            rows,
        }
    }

    #[test]
    fn trim_drops_exactly_the_annotation_columns() -> Result<(), ProcessError> {
        let trimmed = trim_probes(&probes_table())?;
        assert_eq!(trimmed.columns, vec!["ID"]);
        assert_eq!(trimmed.rows, vec![vec!["v0"]]);
        Ok(())
    }

    #[test]
    fn trim_of_table_without_annotation_columns_is_an_error() {
        let table = ParsedTable {
            key: "Probes".to_string(),
            columns: vec!["ID".to_string()],
            rows: vec![vec!["P1".to_string()]],
        };
        let err = trim_probes(&table).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::MissingColumn { table, column }
                if table == "Probes" && column == "Definition"
        ));
    }

    #[test]
    fn fan_out_writes_full_and_trimmed_probes() -> Result<()> {
        let dir = tempdir()?;
        let out = write_tables(dir.path(), "X", &[probes_table()])?;
        assert!(out.skipped.is_empty());
        assert_eq!(out.files.len(), 2);
        assert!(dir.path().join("X_Probes.tsv").exists());
        let trimmed = fs::read_to_string(dir.path().join("X_Probes_trimmed.tsv"))?;
        assert_eq!(trimmed, "ID\nv0\n");
        Ok(())
    }

    #[test]
    fn failed_projection_skips_only_that_output() -> Result<()> {
        let dir = tempdir()?;
        let table = ParsedTable {
            key: "Probes".to_string(),
            columns: vec!["ID".to_string()],
            rows: vec![vec!["P1".to_string()]],
        };
        let out = write_tables(dir.path(), "X", &[table])?;
        assert_eq!(out.files.len(), 1);
        assert_eq!(out.skipped.len(), 1);
        assert!(dir.path().join("X_Probes.tsv").exists());
        assert!(!dir.path().join("X_Probes_trimmed.tsv").exists());
        Ok(())
    }

    #[test]
    fn rewrite_produces_identical_bytes() -> Result<()> {
        let dir = tempdir()?;
        let table = probes_table();
        write_tables(dir.path(), "X", std::slice::from_ref(&table))?;
        let first = fs::read(dir.path().join("X_Probes.tsv"))?;
        write_tables(dir.path(), "X", std::slice::from_ref(&table))?;
        let second = fs::read(dir.path().join("X_Probes.tsv"))?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn written_table_reparses_to_itself() -> Result<()> {
        let dir = tempdir()?;
        let table = probes_table();
        write_tables(dir.path(), "X", std::slice::from_ref(&table))?;

        let text = fs::read_to_string(dir.path().join("X_Probes.tsv"))?;
        let section = RawSection {
            key: Some("Probes".to_string()),
            lines: text.lines().map(str::to_string).collect(),
        };
        let reparsed = parse_section(&section)?;
        assert_eq!(reparsed, table);
        Ok(())
    }
}
