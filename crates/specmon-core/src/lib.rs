//! Core domain logic for the spec monitoring service.
//!
//! This crate holds the pure parts of the intake pipeline:
//! - `record`: the structured record extracted from a spec document, the
//!   recognized section headers, and the completeness check
//! - `extract`: segment-by-header field extraction from raw document text
//! - `diff`: new-file detection against the known-filenames baseline
//!
//! Everything here is I/O free; reading folders, PDFs, the database and the
//! mail server live in the service crate.

pub mod diff;
pub mod extract;
pub mod record;

pub use diff::new_files;
pub use extract::parse_spec_text;
pub use record::{Folder, ParseFolderError, SectionHeader, SpecRecord};
