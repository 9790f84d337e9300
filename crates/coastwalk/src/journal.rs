//! Journal stubs and the journal index.
//!
//! Each walk gets `<journals_dir>/<track stem>.md`, written once from a fixed
//! template. An existing journal is never opened for writing: creation uses
//! `create_new`, so even a file that appears between the check and the write
//! is left alone.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::config::ResolvedPaths;
use crate::error::{Error, Result};
use crate::fsutil;
use crate::manifest::Manifest;
use crate::naming;

/// Extension of journal files.
pub const JOURNAL_EXTENSION: &str = "md";

/// Outcome of a journal generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalReport {
    /// File names of journals created in this pass.
    pub created: Vec<String>,
    /// Number of journals that already existed.
    pub existing: usize,
}

/// Markdown stub for a new journal.
#[must_use]
pub fn journal_template(name: &str) -> String {
    format!(
        "# {name}\n\n\
         | Section Walked   | Distance | Date |\n\
         | -------- | ------- | ---- |\n\
         |   |    | \n\
         |   |    | \n\n\
         ## Notes\n"
    )
}

/// Create missing journals for every walk in `manifest`.
///
/// # Errors
///
/// Returns an error if the journals directory can't be created or a new
/// journal can't be written.
pub fn generate(paths: &ResolvedPaths, manifest: &Manifest) -> Result<JournalReport> {
    fsutil::ensure_dir(&paths.journals_dir)?;

    let mut report = JournalReport::default();
    for walk in &manifest.walks {
        let Some(stem) = walk.stem() else {
            debug!("skipping walk {:?} without a track stem", walk.name);
            continue;
        };
        let file_name = naming::journal_file_name(&stem);
        let path = paths.journals_dir.join(&file_name);

        if create_journal(&path, &journal_template(&walk.name))? {
            info!("created journal {file_name}");
            report.created.push(file_name);
        } else {
            report.existing += 1;
        }
    }
    Ok(report)
}

/// Write `contents` to `path` only if no file is there. Returns whether the
/// file was created.
fn create_journal(path: &Path, contents: &str) -> Result<bool> {
    let file = OpenOptions::new().write(true).create_new(true).open(path);
    let mut file = match file {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => {
            return Err(Error::FileWrite {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    file.write_all(contents.as_bytes())
        .map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(true)
}

/// Sorted file names of all journals, excluding the index file.
///
/// # Errors
///
/// Returns an error if the journals directory can't be listed.
pub fn journal_names(paths: &ResolvedPaths) -> Result<Vec<String>> {
    let index_name = paths.journal_index.file_name();
    let files = fsutil::list_files(&paths.journals_dir, JOURNAL_EXTENSION)?.unwrap_or_default();
    Ok(files
        .iter()
        .filter(|path| path.file_name() != index_name)
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// Write the journal index: a JSON array of journal file names.
///
/// # Errors
///
/// Returns an error if the journals can't be listed or the index written.
pub fn write_index(paths: &ResolvedPaths) -> Result<Vec<String>> {
    let names = journal_names(paths)?;
    let mut json = serde_json::to_string_pretty(&names)?;
    json.push('\n');
    fsutil::write_file(&paths.journal_index, &json)?;
    debug!(
        "wrote {} journal name(s) to {}",
        names.len(),
        paths.journal_index.display()
    );
    Ok(names)
}
