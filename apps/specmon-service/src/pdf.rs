//! PDF text acquisition boundary.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A document whose text could not be obtained (corrupt, locked, missing).
#[derive(Debug, Error)]
#[error("unreadable document {}: {}", path.display(), reason)]
pub struct UnreadableDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Source of document text for the pipeline.
///
/// Production reads PDFs from disk; tests substitute scripted text so the
/// pipeline can be exercised without real PDF fixtures.
pub trait DocumentSource: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, UnreadableDocument>;
}

/// Filesystem-backed source using `pdf-extract`.
pub struct PdfTextSource;

impl DocumentSource for PdfTextSource {
    fn extract_text(&self, path: &Path) -> Result<String, UnreadableDocument> {
        pdf_extract::extract_text(path).map_err(|err| UnreadableDocument {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}
