//! The full run: ingest tracks, write journals, rebuild the TOC, draw the map.
//!
//! Each stage re-reads what the previous one wrote, so any stage can also be
//! run on its own and a full rerun with no new tracks changes nothing but
//! the map.

use tracing::info;

use crate::config::{Config, ResolvedPaths};
use crate::error::Result;
use crate::ingest::{self, Ingestion};
use crate::journal::{self, JournalReport};
use crate::manifest::ManifestStore;
use crate::map::{self, Measurement};
use crate::toc::{self, TocReport};

/// Everything a full run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Track ingestion result; `new_walks` were appended to the manifest.
    pub ingestion: Ingestion,
    /// Journals created.
    pub journals: JournalReport,
    /// Journal file names written to the journal index.
    pub journal_index: Vec<String>,
    /// TOC rebuild result.
    pub toc: TocReport,
    /// Distances and rendered paths.
    pub measurement: Measurement,
}

/// Run every stage in order.
///
/// # Errors
///
/// Returns the first fatal error: a malformed manifest or TOC, or a file that
/// can't be written. Missing inputs and bad track files are not fatal.
pub fn run(paths: &ResolvedPaths, config: &Config) -> Result<RunReport> {
    let store = ManifestStore::new(paths);

    let ingestion = ingest::ingest(paths, &store, false)?;
    let manifest = store.load()?;

    let journals = journal::generate(paths, &manifest)?;
    let journal_index = journal::write_index(paths)?;

    let toc = toc::rebuild(paths, &config.toc.default_region)?;

    let measurement = map::render(paths, config, &manifest, &ingestion.new_walks)?;

    info!(
        "run complete: {} new walk(s), {} new journal(s), {:.2} km total",
        ingestion.new_walks.len(),
        journals.created.len(),
        measurement.total_km
    );
    Ok(RunReport {
        ingestion,
        journals,
        journal_index,
        toc,
        measurement,
    })
}
