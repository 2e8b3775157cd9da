//! Filesystem metadata queries and directory operations.
//!
//! All operations are synchronous and return a definite result or a
//! classified error. Deleting a file that does not exist is a successful
//! no-op (idempotent delete), reported as `false` so callers can tell the
//! two success cases apart.

use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::{CapError, CapResult};

fn classify(err: std::io::Error, path: &Path) -> CapError {
    let shown = path.display();
    match err.kind() {
        std::io::ErrorKind::NotFound => CapError::NotFound(shown.to_string()),
        std::io::ErrorKind::PermissionDenied => CapError::PermissionDenied(shown.to_string()),
        std::io::ErrorKind::AlreadyExists => CapError::AlreadyExists(shown.to_string()),
        std::io::ErrorKind::DirectoryNotEmpty => CapError::NotEmpty(shown.to_string()),
        _ => CapError::Io(err),
    }
}

/// Whether `path` names an existing regular file.
#[must_use]
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Byte length of the file at `path`.
pub fn file_len(path: &Path) -> CapResult<u64> {
    let meta = std::fs::metadata(path).map_err(|e| classify(e, path))?;
    if !meta.is_file() {
        return Err(CapError::InvalidArgument(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    Ok(meta.len())
}

/// Last-modified time of the file at `path`, as seconds since the epoch.
pub fn file_modified(path: &Path) -> CapResult<u64> {
    let meta = std::fs::metadata(path).map_err(|e| classify(e, path))?;
    let modified = meta.modified().map_err(|e| classify(e, path))?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| CapError::InvalidState(format!("pre-epoch mtime: {e}")))?;
    Ok(since_epoch.as_secs())
}

/// Remove the file at `path`.
///
/// Returns `true` when a file was removed and `false` when there was
/// nothing to remove; only other failures (permissions, I/O) are errors.
pub fn file_delete(path: &Path) -> CapResult<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(classify(err, path)),
    }
}

/// Whether `path` names an existing directory.
#[must_use]
pub fn dir_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Change the process working directory to `path`.
pub fn dir_change(path: &Path) -> CapResult<()> {
    std::env::set_current_dir(path).map_err(|e| classify(e, path))
}

/// Create the directory at `path` (single level).
pub fn dir_create(path: &Path) -> CapResult<()> {
    std::fs::create_dir(path).map_err(|e| classify(e, path))
}

/// Remove the directory at `path`; it must be empty.
pub fn dir_delete(path: &Path) -> CapResult<()> {
    std::fs::remove_dir(path).map_err(|e| classify(e, path))
}

/// Rewrite both separator conventions in `path` to the host's.
#[must_use]
pub fn to_native_path(path: &str) -> String {
    let native = std::path::MAIN_SEPARATOR;
    path.chars()
        .map(|c| if c == '/' || c == '\\' { native } else { c })
        .collect()
}
