// src/process/split.rs
//
// A GEO supplementary text file packs several tables into one stream, each
// introduced by a bracketed marker line such as `[Heading]` or `[Probes]`.
// This module cuts that stream into per-section line buffers.

/// One section of the source stream: its bracketed key (if any boundary line
/// introduced it) and the raw lines that followed, boundary line excluded.
/// `key` is `None` for content that precedes the first boundary, or for a
/// stream that contains no boundary line at all.
#[derive(Debug, PartialEq, Eq)]
pub struct RawSection {
    pub key: Option<String>,
    pub lines: Vec<String>,
}

/// Split `text` into its ordered sections.
///
/// A line starting with `[` is a boundary; its key is the text between the
/// brackets. Each boundary flushes the section being buffered and opens the
/// next one; boundary lines themselves belong to no buffer. The last section
/// never sees a following boundary, so it is flushed unconditionally at end
/// of stream, even with an empty buffer.
pub fn split_sections(text: &str) -> Vec<RawSection> {
    let mut sections = Vec::new();
    let mut key: Option<String> = None;
    let mut buffer: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.starts_with('[') {
            // A boundary-first stream has no leading section to flush.
            if key.is_some() || !buffer.is_empty() {
                sections.push(RawSection {
                    key: key.take(),
                    lines: std::mem::take(&mut buffer),
                });
            }
            key = Some(line.trim().trim_matches(['[', ']']).to_string());
            continue;
        }
        buffer.push(line.to_string());
    }

    sections.push(RawSection { key, lines: buffer });
    sections
}
