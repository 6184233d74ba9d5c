//! Watched-folder listing.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

/// List the regular files in `path`, sorted by name for deterministic runs.
///
/// Failure here is a routing decision for the caller: the pipeline reports
/// it to the admin and continues with an empty listing so the other watched
/// folder still gets processed.
pub fn list_folder(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    info!(path = %path.display(), count = files.len(), "retrieved folder contents");
    Ok(files)
}
