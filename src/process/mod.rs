// src/process/mod.rs
pub mod error;
pub mod split;
pub mod table;
pub mod unpack;
pub mod write;

pub use error::ProcessError;
pub use split::{split_sections, RawSection};
pub use table::{parse_section, HeaderMode, ParsedTable};
pub use unpack::{process_member, unpack_tar, UnpackSummary};
pub use write::{trim_probes, write_tables, PROBE_TRIM_COLUMNS};
