//! Directory scan: list the images a run will process.
//!
//! Only regular files whose extension is supported (see
//! [`crate::pipeline::mime::is_supported_extension`]) are kept. The result is
//! sorted by filename so two runs over the same directory visit files in the
//! same order.

use crate::error::RenameError;
use crate::pipeline::mime::is_supported_extension;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Collect the supported images directly inside `dir` (no recursion).
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, RenameError> {
    if !dir.exists() {
        return Err(RenameError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(RenameError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| RenameError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RenameError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()).is_none() {
            warn!("Skipping non-UTF-8 filename: {}", path.display());
            continue;
        }
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_supported_extension);
        if supported {
            images.push(path);
        }
    }

    images.sort();
    debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}
