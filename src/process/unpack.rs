// src/process/unpack.rs
//
// Walks a downloaded `*_RAW.tar`, gunzips each member into memory, and runs
// the split → materialize → fan-out pipeline on it. Members are handled one
// at a time; a failure in one never aborts its siblings.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tar::Archive;
use tracing::{debug, error, info, instrument, warn};

use crate::process::error::ProcessError;
use crate::process::split::split_sections;
use crate::process::table::{parse_section, ParsedTable};
use crate::process::write::{write_tables, WrittenOutputs};

/// What one unpack run produced.
#[derive(Debug, Default)]
pub struct UnpackSummary {
    pub members_ok: usize,
    pub members_failed: usize,
    pub outputs: Vec<PathBuf>,
}

/// Unpack every member of the tar at `tar_path` into per-member folders under
/// `out_root`. Each member yields one `.tsv` per section (two for `Probes`).
#[instrument(level = "info", skip(tar_path, out_root), fields(tar = %tar_path.as_ref().display()))]
pub fn unpack_tar<P: AsRef<Path>, Q: AsRef<Path>>(tar_path: P, out_root: Q) -> Result<UnpackSummary> {
    let start = Instant::now();
    let out_root = out_root.as_ref();
    fs::create_dir_all(out_root)
        .with_context(|| format!("creating output root {}", out_root.display()))?;

    let file = File::open(tar_path.as_ref())
        .with_context(|| format!("opening archive {}", tar_path.as_ref().display()))?;
    let mut archive = Archive::new(file);

    let mut summary = UnpackSummary::default();
    for entry in archive.entries().context("reading tar entries")? {
        let mut entry = entry.context("reading tar entry header")?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let member = entry.path().context("decoding member path")?.display().to_string();
        info!(member = %member, size = entry.size(), "archive member");

        match process_entry(&mut entry, &member, out_root) {
            Ok(out) if out.skipped.is_empty() => {
                summary.members_ok += 1;
                summary.outputs.extend(out.files);
            }
            Ok(out) => {
                warn!(member = %member, skipped = out.skipped.len(), "member finished with skipped outputs");
                summary.members_failed += 1;
                summary.outputs.extend(out.files);
            }
            Err(e) => {
                error!(member = %member, "member failed: {e:#}");
                summary.members_failed += 1;
            }
        }
    }

    info!(
        ok = summary.members_ok,
        failed = summary.members_failed,
        files = summary.outputs.len(),
        "completed in {:?}",
        start.elapsed()
    );
    Ok(summary)
}

/// Gunzip one member and run the per-member pipeline on its text.
fn process_entry<R: Read>(entry: &mut R, member: &str, out_root: &Path) -> Result<WrittenOutputs> {
    let mut text = String::new();
    GzDecoder::new(entry)
        .read_to_string(&mut text)
        .map_err(|source| ProcessError::Acquisition {
            member: member.to_string(),
            source,
        })?;

    // Member base name minus its final extension, e.g. `GSM1.txt.gz` → `GSM1.txt`.
    let folder_name = Path::new(member)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .with_context(|| format!("member `{member}` has no usable base name"))?;
    let dest_dir = out_root.join(&folder_name);

    process_member(&text, &folder_name, &dest_dir)
}

/// Split one decompressed member into sections, materialize every keyed
/// section, and write the resulting tables. Only when every step succeeded is
/// a leftover raw-text artifact from an earlier run swept out of the
/// destination folder; a failed member keeps its evidence on disk.
pub fn process_member(text: &str, folder_name: &str, dest_dir: &Path) -> Result<WrittenOutputs> {
    let sections = split_sections(text);
    let keyed = sections.iter().any(|s| s.key.is_some());

    let mut tables: Vec<ParsedTable> = Vec::new();
    for section in &sections {
        if section.key.is_none() {
            if keyed {
                // Content ahead of the first marker has no destination table.
                debug!(lines = section.lines.len(), "discarding content before first section marker");
                continue;
            }
            // No marker ever appeared; refuse to invent a key for the stream.
            return Err(ProcessError::EmptySection {
                section: String::new(),
            })
            .with_context(|| format!("no section markers in member `{folder_name}`"));
        }
        let table = parse_section(section)
            .with_context(|| format!("materializing section in member `{folder_name}`"))?;
        tables.push(table);
    }

    let out = write_tables(dest_dir, folder_name, &tables)?;

    if out.skipped.is_empty() {
        remove_raw_artifact(dest_dir, folder_name)?;
    }
    Ok(out)
}

/// Drop the decompressed `.txt` a previous run may have left next to the
/// tables.
fn remove_raw_artifact(dest_dir: &Path, folder_name: &str) -> Result<()> {
    let leftover = dest_dir.join(format!("{folder_name}.txt"));
    if leftover.exists() {
        fs::remove_file(&leftover)
            .with_context(|| format!("removing leftover {}", leftover.display()))?;
        info!(path = %leftover.display(), "removed raw-text artifact");
    }
    Ok(())
}
