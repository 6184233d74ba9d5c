//! Startup bootstrap for the watched folders and the CSV output directory.

use std::io;
use std::path::Path;

use tracing::info;

/// Create any directory in `paths` that does not exist yet.
pub fn ensure_directories_exist<P: AsRef<Path>>(paths: &[P]) -> io::Result<()> {
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::create_dir_all(path)?;
            info!(path = %path.display(), "created directory");
        }
    }
    Ok(())
}
