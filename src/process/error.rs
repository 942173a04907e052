// src/process/error.rs
use thiserror::Error;

/// Failures raised while turning one archive member into its table files.
/// Each variant carries the member/section context needed to diagnose a run
/// without repeating it.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The member could not be read out of the archive or decompressed.
    /// Fatal for that member; sibling members are unaffected.
    #[error("could not read archive member `{member}`: {source}")]
    Acquisition {
        member: String,
        #[source]
        source: std::io::Error,
    },

    /// A header was expected but the section buffer holds no lines, or the
    /// stream produced no keyed section at all.
    #[error("section `{section}` has no lines to infer a header from")]
    EmptySection { section: String },

    /// A data line's field count does not match the established column count.
    /// Ragged rows are never padded or truncated.
    #[error("section `{section}` line {line}: expected {expected} fields, found {found}")]
    MalformedSection {
        section: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// An inferred header row repeats a column name.
    #[error("section `{section}` header repeats column `{column}`")]
    DuplicateColumn { section: String, column: String },

    /// A declared projection names a column the table does not have.
    /// Fatal for that output only.
    #[error("table `{table}` is missing column `{column}` required by the trim projection")]
    MissingColumn { table: String, column: String },
}
