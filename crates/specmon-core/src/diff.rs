//! New-file detection against the known-filenames baseline.

use std::collections::HashSet;
use std::path::PathBuf;

/// Paths from `current` whose base filename is not yet in `known`.
///
/// Only the base filename takes part in the comparison; the full path comes
/// back because later stages need it to open the file. Input order is
/// preserved. Paths without a base name are treated as already known.
pub fn new_files(current: &[PathBuf], known: &HashSet<String>) -> Vec<PathBuf> {
    current
        .iter()
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy())
                .is_some_and(|name| !known.contains(name.as_ref()))
        })
        .cloned()
        .collect()
}
