//! File system helpers shared by the stages.
//!
//! A missing file or directory is reported as `Ok(None)` so callers can treat
//! it as reduced scope; every other I/O failure is an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Read a UTF-8 file, returning `None` if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but can't be read.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("{} not found", path.display());
            Ok(None)
        }
        Err(source) => Err(Error::FileRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create `dir` and its parents if needed.
///
/// # Errors
///
/// Returns an error if the directory can't be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `contents` to `path`, creating parent directories and replacing any
/// existing file.
///
/// # Errors
///
/// Returns an error if the parent can't be created or the write fails.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, contents).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Files directly inside `dir` with the given extension (case-insensitive),
/// sorted by file name. Returns `None` if `dir` doesn't exist.
///
/// # Errors
///
/// Returns an error if the directory exists but can't be listed.
pub fn list_files(dir: &Path, extension: &str) -> Result<Option<Vec<PathBuf>>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(Some(files))
}
