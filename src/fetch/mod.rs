// src/fetch/mod.rs
pub mod archives;
pub mod urls;
