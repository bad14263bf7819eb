use std::path::{Path, PathBuf};

use crate::error::Result;

/// List the files in `dir` whose extension matches `extension`
/// (case-insensitive, leading dot optional). Other entries are ignored.
/// Sorted by path so batches run in a stable order.
pub fn discover_images(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
