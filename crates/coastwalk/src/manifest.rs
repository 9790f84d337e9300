//! The walk manifest.
//!
//! A YAML file with a single top-level `walks` list. Records are only ever
//! appended; the normalized track reference is the uniqueness key.
//!
//! ```yaml
//! walks:
//! - name: S Queensferry To Boness
//!   gpx: gpx/s-queensferry-to-boness.gpx
//!   journal: journals/s-queensferry-to-boness.md
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::config::ResolvedPaths;
use crate::error::{Error, Result};
use crate::fsutil;
use crate::naming;

/// One walk: a track file and the journal written about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkRecord {
    /// Display name. Defaults to the name derived from the track stem.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Track file reference, relative to the project root.
    pub gpx: String,
    /// Journal reference, relative to the project root. Defaults to
    /// `<journals_dir>/<stem>.md`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub journal: String,
}

impl WalkRecord {
    /// Build the record for a newly discovered track.
    #[must_use]
    pub fn for_track(track_ref: &str, journals_dir: &Path) -> Self {
        let track_ref = naming::normalize_ref(track_ref);
        let stem = naming::track_stem(&track_ref).unwrap_or_default();
        Self {
            name: naming::display_name(&stem),
            journal: naming::journal_ref(journals_dir, &stem),
            gpx: track_ref,
        }
    }

    /// Uniqueness key: the normalized track reference.
    #[must_use]
    pub fn key(&self) -> String {
        naming::normalize_ref(&self.gpx)
    }

    /// Stem of the track file, which also names the journal.
    #[must_use]
    pub fn stem(&self) -> Option<String> {
        naming::track_stem(&self.gpx)
    }

    fn fill_defaults(&mut self, journals_dir: &Path) {
        let Some(stem) = self.stem() else {
            return;
        };
        if self.name.trim().is_empty() {
            self.name = naming::display_name(&stem);
        }
        if self.journal.trim().is_empty() {
            self.journal = naming::journal_ref(journals_dir, &stem);
        }
    }
}

/// Ordered, append-only collection of walk records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Walk records in insertion order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub walks: Vec<WalkRecord>,
}

impl Manifest {
    /// Parse manifest YAML. Blank input is an empty manifest.
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

    /// Serialize to YAML, preserving record order.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Normalized track references of every record.
    #[must_use]
    pub fn keys(&self) -> HashSet<String> {
        self.walks.iter().map(WalkRecord::key).collect()
    }

    /// Whether a record with this track reference exists.
    #[must_use]
    pub fn contains(&self, track_ref: &str) -> bool {
        let key = naming::normalize_ref(track_ref);
        self.walks.iter().any(|walk| walk.key() == key)
    }

    /// Append records whose key isn't present yet, returning the ones added.
    pub fn append(&mut self, records: impl IntoIterator<Item = WalkRecord>) -> Vec<WalkRecord> {
        let mut keys = self.keys();
        let mut added = Vec::new();
        for record in records {
            if keys.insert(record.key()) {
                self.walks.push(record.clone());
                added.push(record);
            } else {
                debug!("{} already in manifest", record.gpx);
            }
        }
        added
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.walks.len()
    }

    /// Whether the manifest has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.walks.is_empty()
    }

    fn fill_defaults(&mut self, journals_dir: &Path) {
        for walk in &mut self.walks {
            walk.fill_defaults(journals_dir);
        }
    }
}

/// Loads and saves the manifest file.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
    journals_dir: PathBuf,
}

impl ManifestStore {
    /// Store for the project's configured manifest.
    #[must_use]
    pub fn new(paths: &ResolvedPaths) -> Self {
        Self {
            path: paths.manifest.clone(),
            journals_dir: PathBuf::from(naming::relative_ref(&paths.journals_dir, &paths.root)),
        }
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative journals directory used for defaulted journal references.
    #[must_use]
    pub fn journals_dir(&self) -> &Path {
        &self.journals_dir
    }

    /// Load the manifest, or an empty one if the file doesn't exist.
    ///
    /// Records written without a `name` or `journal` get the values derived
    /// from their track stem. The file itself is left as written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestParse`] if the file is malformed, or an I/O
    /// error if it can't be read.
    pub fn load(&self) -> Result<Manifest> {
        let mut manifest = self.read()?;
        manifest.fill_defaults(&self.journals_dir);
        Ok(manifest)
    }

    /// The records exactly as stored.
    fn read(&self) -> Result<Manifest> {
        let Some(contents) = fsutil::read_optional(&self.path)? else {
            debug!("no manifest at {}, starting empty", self.path.display());
            return Ok(Manifest::default());
        };
        let manifest = Manifest::from_yaml(&contents).map_err(|source| Error::ManifestParse {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            "loaded {} walk(s) from {}",
            manifest.len(),
            self.path.display()
        );
        Ok(manifest)
    }

    /// Write the whole manifest, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        fsutil::write_file(&self.path, &manifest.to_yaml()?)?;
        info!(
            "saved {} walk(s) to {}",
            manifest.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Append `records` to the stored manifest and save if anything was
    /// added. Existing records are written back unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or saving fails.
    pub fn append(&self, records: Vec<WalkRecord>) -> Result<Vec<WalkRecord>> {
        let mut manifest = self.read()?;
        let added = manifest.append(records);
        if !added.is_empty() {
            self.save(&manifest)?;
        }
        Ok(added)
    }
}

/// Deserialize a list that may be written as `null` or omitted.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn store(root: &Path) -> ManifestStore {
        ManifestStore::new(&Config::default().resolve_paths(root))
    }

    #[test]
    fn test_for_track() {
        let record = WalkRecord::for_track("./gpx/s-queensferry-to-boness.gpx", Path::new("journals"));
        assert_eq!(record.name, "S Queensferry To Boness");
        assert_eq!(record.gpx, "gpx/s-queensferry-to-boness.gpx");
        assert_eq!(record.journal, "journals/s-queensferry-to-boness.md");
    }

    #[test]
    fn test_key_is_normalized() {
        let record = WalkRecord {
            name: "Dunbar".to_string(),
            gpx: "./gpx\\dunbar.gpx".to_string(),
            journal: String::new(),
        };
        assert_eq!(record.key(), "gpx/dunbar.gpx");
    }

    #[test]
    fn test_from_yaml_blank_and_null() {
        assert!(Manifest::from_yaml("").unwrap().is_empty());
        assert!(Manifest::from_yaml("walks:\n").unwrap().is_empty());
        assert!(Manifest::from_yaml("{}\n").unwrap().is_empty());
    }

    #[test]
    fn test_from_yaml_missing_gpx_is_malformed() {
        assert!(Manifest::from_yaml("walks:\n- name: Nowhere\n").is_err());
    }

    #[test]
    fn test_append_skips_existing_and_batch_duplicates() {
        let mut manifest = Manifest::default();
        let a = WalkRecord::for_track("gpx/a.gpx", Path::new("journals"));
        let b = WalkRecord::for_track("gpx/b.gpx", Path::new("journals"));

        assert_eq!(manifest.append(vec![a.clone()]).len(), 1);
        let added = manifest.append(vec![a.clone(), b.clone(), b.clone()]);

        assert_eq!(added, vec![b]);
        assert_eq!(manifest.len(), 2);
        assert!(manifest.contains("./gpx/a.gpx"));
    }

    #[test]
    fn test_to_yaml_field_order() {
        let mut manifest = Manifest::default();
        manifest.append(vec![WalkRecord::for_track("gpx/a.gpx", Path::new("journals"))]);

        let yaml = manifest.to_yaml().unwrap();
        let name = yaml.find("name:").unwrap();
        let gpx = yaml.find("gpx:").unwrap();
        let journal = yaml.find("journal:").unwrap();
        assert!(yaml.starts_with("walks:"));
        assert!(name < gpx && gpx < journal);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        fsutil::write_file(store.path(), "walks: [unclosed\n").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[test]
    fn test_load_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        fsutil::write_file(store.path(), "walks:\n- gpx: gpx/north-berwick.gpx\n").unwrap();

        let manifest = store.load().unwrap();
        assert_eq!(manifest.walks[0].name, "North Berwick");
        assert_eq!(manifest.walks[0].journal, "journals/north-berwick.md");
    }

    #[test]
    fn test_append_leaves_hand_written_records_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        fsutil::write_file(store.path(), "walks:\n- gpx: gpx/north-berwick.gpx\n").unwrap();

        let added = store
            .append(vec![WalkRecord::for_track("gpx/dunbar.gpx", store.journals_dir())])
            .unwrap();
        assert_eq!(added.len(), 1);

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with("walks:\n- gpx: gpx/north-berwick.gpx\n"));
        let stored = Manifest::from_yaml(&contents).unwrap();
        assert!(stored.walks[0].name.is_empty());
        assert!(stored.walks[0].journal.is_empty());
        assert_eq!(stored.walks[1].name, "Dunbar");

        assert_eq!(store.load().unwrap().walks[0].name, "North Berwick");
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut manifest = Manifest::default();
        manifest.append(["gpx/c.gpx", "gpx/a.gpx", "gpx/b.gpx"].map(|t| {
            WalkRecord::for_track(t, store.journals_dir())
        }));

        store.save(&manifest).unwrap();
        assert_eq!(store.load().unwrap(), manifest);
    }

    #[test]
    fn test_store_append_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let records = vec![WalkRecord::for_track("gpx/a.gpx", store.journals_dir())];

        assert_eq!(store.append(records.clone()).unwrap().len(), 1);
        let before = std::fs::read_to_string(store.path()).unwrap();
        assert!(store.append(records).unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }
}
