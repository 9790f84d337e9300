//! Track ingestion: find track files the manifest doesn't know about yet.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::ResolvedPaths;
use crate::error::Result;
use crate::fsutil;
use crate::manifest::{Manifest, ManifestStore, WalkRecord};
use crate::naming;

/// Extension of track files.
pub const TRACK_EXTENSION: &str = "gpx";

/// Result of scanning the track directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingestion {
    /// Track files found, in name order.
    pub scanned: Vec<PathBuf>,
    /// Records for tracks missing from the manifest, in name order.
    pub new_walks: Vec<WalkRecord>,
    /// Whether the track directory was missing.
    pub missing_dir: bool,
}

/// Compare the track directory against `manifest`.
///
/// Nothing is written; the caller decides whether to persist `new_walks`.
/// A missing track directory is logged and yields an empty result.
///
/// # Errors
///
/// Returns an error if the track directory exists but can't be listed.
pub fn scan(paths: &ResolvedPaths, manifest: &Manifest, store: &ManifestStore) -> Result<Ingestion> {
    let Some(files) = fsutil::list_files(&paths.tracks_dir, TRACK_EXTENSION)? else {
        warn!("track folder does not exist: {}", paths.tracks_dir.display());
        return Ok(Ingestion {
            missing_dir: true,
            ..Ingestion::default()
        });
    };

    let mut known = manifest.keys();
    let mut new_walks = Vec::new();
    for file in &files {
        let track_ref = naming::relative_ref(file, &paths.root);
        if known.insert(track_ref.clone()) {
            let record = WalkRecord::for_track(&track_ref, store.journals_dir());
            debug!("new track {} -> {}", record.gpx, record.name);
            new_walks.push(record);
        }
    }

    debug!(
        "scanned {} track file(s), {} new",
        files.len(),
        new_walks.len()
    );
    Ok(Ingestion {
        scanned: files,
        new_walks,
        missing_dir: false,
    })
}

/// Scan for new tracks and append them to the manifest file.
///
/// Returns the ingestion result; `new_walks` holds exactly the records that
/// were appended. With `dry_run` the manifest is left untouched.
///
/// # Errors
///
/// Returns an error if the manifest is malformed or can't be written.
pub fn ingest(paths: &ResolvedPaths, store: &ManifestStore, dry_run: bool) -> Result<Ingestion> {
    let manifest = store.load()?;
    let mut ingestion = scan(paths, &manifest, store)?;

    if ingestion.new_walks.is_empty() {
        info!("no new track files found");
        return Ok(ingestion);
    }

    if dry_run {
        info!(
            "{} new track file(s) found (dry run, manifest unchanged)",
            ingestion.new_walks.len()
        );
        return Ok(ingestion);
    }

    ingestion.new_walks = store.append(ingestion.new_walks)?;
    for walk in &ingestion.new_walks {
        info!("added new walk: {}", walk.gpx);
    }
    Ok(ingestion)
}
