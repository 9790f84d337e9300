//! Table of contents: walk names grouped by region.
//!
//! ```yaml
//! All Walk Sections:
//! - region: Unknown
//!   walks:
//!   - North Berwick
//!   - S Queensferry To Boness
//! ```
//!
//! Regions are edited by hand (moving names between groups); rebuilding only
//! adds journals that appear in no group, then re-sorts.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ResolvedPaths;
use crate::error::{Error, Result};
use crate::fsutil;
use crate::journal;
use crate::manifest::null_as_empty;
use crate::naming;

/// A region label and the walks filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBlock {
    /// Region label.
    pub region: String,
    /// Walk display names.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub walks: Vec<String>,
}

impl RegionBlock {
    fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            walks: Vec::new(),
        }
    }
}

/// The whole table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    /// Region groups.
    #[serde(
        rename = "All Walk Sections",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub sections: Vec<RegionBlock>,
}

/// Outcome of a rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocReport {
    /// Names added to the default region.
    pub added: Vec<String>,
    /// Number of region groups after the rebuild.
    pub regions: usize,
    /// Total number of walks listed.
    pub walks: usize,
}

impl Toc {
    /// Parse TOC YAML. Blank input is an empty TOC.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document is malformed.
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load the TOC file, or an empty TOC if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TocParse`] if the file is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let Some(contents) = fsutil::read_optional(path)? else {
            return Ok(Self::default());
        };
        Self::from_yaml(&contents).map_err(|source| Error::TocParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the TOC file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        fsutil::write_file(path, &self.to_yaml()?)
    }

    /// Every walk name in any region.
    #[must_use]
    pub fn names(&self) -> HashSet<&str> {
        self.sections
            .iter()
            .flat_map(|block| block.walks.iter().map(String::as_str))
            .collect()
    }

    /// Add names that appear in no region to `default_region` (creating it if
    /// needed) and return the ones added. Does not sort.
    pub fn insert_missing(
        &mut self,
        names: impl IntoIterator<Item = String>,
        default_region: &str,
    ) -> Vec<String> {
        let mut known: HashSet<String> = self.names().into_iter().map(str::to_string).collect();
        let index = self.region_index(default_region);

        let mut added = Vec::new();
        for name in names {
            if known.insert(name.clone()) {
                self.sections[index].walks.push(name.clone());
                added.push(name);
            }
        }
        added
    }

    /// Sort walks within each region, then regions by label. Both are
    /// case-insensitive and stable.
    pub fn sort(&mut self) {
        for block in &mut self.sections {
            block.walks.sort_by_cached_key(|walk| walk.to_lowercase());
        }
        self.sections
            .sort_by_cached_key(|block| block.region.to_lowercase());
    }

    fn region_index(&mut self, region: &str) -> usize {
        if let Some(index) = self.sections.iter().position(|b| b.region == region) {
            index
        } else {
            self.sections.push(RegionBlock::new(region));
            self.sections.len() - 1
        }
    }

    fn walk_count(&self) -> usize {
        self.sections.iter().map(|block| block.walks.len()).sum()
    }
}

/// Merge the journal files into the TOC file and re-sort it.
///
/// # Errors
///
/// Returns an error if the existing TOC is malformed, the journals can't be
/// listed, or the TOC can't be written.
pub fn rebuild(paths: &ResolvedPaths, default_region: &str) -> Result<TocReport> {
    let mut toc = Toc::load(&paths.toc)?;

    let names = journal::journal_names(paths)?.into_iter().filter_map(|file| {
        Path::new(&file)
            .file_stem()
            .map(|stem| naming::display_name(&stem.to_string_lossy()))
    });
    let added = toc.insert_missing(names, default_region);
    for name in &added {
        info!("appended new walk to TOC: {name}");
    }

    toc.sort();
    toc.save(&paths.toc)?;
    debug!("wrote {}", paths.toc.display());

    Ok(TocReport {
        regions: toc.sections.len(),
        walks: toc.walk_count(),
        added,
    })
}
