//! Configuration management for coastwalk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. Every
//! stage receives its file locations through [`ResolvedPaths`] rather than
//! global constants, so a whole run can be pointed at a temporary directory.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE_NAME: &str = "coastwalk.toml";

/// Per-user configuration file name.
const USER_CONFIG_FILE_NAME: &str = "config.toml";

/// Per-user configuration directory name.
const APP_DIR_NAME: &str = "coastwalk";

/// Environment variable prefix.
const ENV_PREFIX: &str = "COASTWALK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `COASTWALK_`, sections split on `__`)
/// 2. The project file `<root>/coastwalk.toml` (or an explicit `--config` file)
/// 3. The per-user file `~/.config/coastwalk/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File and directory locations.
    pub paths: PathsConfig,
    /// Map rendering options.
    pub map: MapConfig,
    /// Distance statistics options.
    pub stats: StatsConfig,
    /// Table-of-contents options.
    pub toc: TocConfig,
}

/// Locations of the project's inputs and outputs, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for `.gpx` track files.
    pub tracks_dir: PathBuf,
    /// The walk manifest.
    pub manifest: PathBuf,
    /// Directory holding the markdown journals.
    pub journals_dir: PathBuf,
    /// File name of the journal index, written inside `journals_dir`.
    pub journal_index: String,
    /// The table-of-contents file.
    pub toc: PathBuf,
    /// Directory the rendered map is written to.
    pub map_dir: PathBuf,
}

/// Map rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Latitude of the initial viewport centre.
    pub center_lat: f64,
    /// Longitude of the initial viewport centre.
    pub center_lon: f64,
    /// Initial zoom level.
    pub zoom: u8,
    /// Tile URL template.
    pub tile_url: String,
    /// Attribution shown for the tile layer.
    pub tile_attribution: String,
    /// Line colour for walks added in the current run.
    pub new_color: String,
    /// Line colour for walks already in the manifest.
    pub known_color: String,
    /// Polyline stroke width in pixels.
    pub line_weight: u32,
    /// File name of the rendered map inside `map_dir`.
    pub output_file: String,
}

/// Statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Reference coastline length the walked distance is measured against.
    pub coastline_km: f64,
}

/// Table-of-contents configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Region label newly discovered walks are filed under.
    pub default_region: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tracks_dir: PathBuf::from("gpx"),
            manifest: PathBuf::from("data/walks.yaml"),
            journals_dir: PathBuf::from("journals"),
            journal_index: "index.json".to_string(),
            toc: PathBuf::from("data/toc.yml"),
            map_dir: PathBuf::from("map"),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 54.5,
            center_lon: -3.0,
            zoom: 6,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_attribution:
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                    .to_string(),
            new_color: "green".to_string(),
            known_color: "blue".to_string(),
            line_weight: 4,
            output_file: "index.html".to_string(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        // Rough estimate of the UK coastline.
        Self {
            coastline_km: 19_000.0,
        }
    }
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            default_region: "Unknown".to_string(),
        }
    }
}

/// Absolute locations every stage works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// The project root; manifest track references are relative to it.
    pub root: PathBuf,
    /// Directory scanned for track files.
    pub tracks_dir: PathBuf,
    /// The walk manifest file.
    pub manifest: PathBuf,
    /// The journals directory.
    pub journals_dir: PathBuf,
    /// The journal index file.
    pub journal_index: PathBuf,
    /// The table-of-contents file.
    pub toc: PathBuf,
    /// The rendered map file.
    pub map_file: PathBuf,
}

impl ResolvedPaths {
    /// Resolve a path from the manifest (track or journal reference) against
    /// the root. Absolute references are returned unchanged.
    #[must_use]
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

impl Config {
    /// Load configuration for the project rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_from(root, None)
    }

    /// Load configuration with an optional explicit config file.
    ///
    /// When `config_path` is `None` the project file `<root>/coastwalk.toml`
    /// is used. Files that don't exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(root: &Path, config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_layers(root, config_path, Self::user_config_path())
    }

    /// Load configuration with an explicit per-user file in place of the one
    /// under the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_layers(
        root: &Path,
        config_path: Option<PathBuf>,
        user_file: Option<PathBuf>,
    ) -> Result<Self> {
        let project_file = config_path.unwrap_or_else(|| Self::project_config_path(root));

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(user_file) = user_file {
            figment = figment.merge(Toml::file(user_file));
        }
        let figment = figment
            .merge(Toml::file(&project_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the project-local configuration file.
    #[must_use]
    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_CONFIG_FILE_NAME)
    }

    /// Path of the per-user configuration file, if a config directory exists.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(USER_CONFIG_FILE_NAME))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.stats.coastline_km.is_nan() || self.stats.coastline_km <= 0.0 {
            return Err(Error::config_validation(format!(
                "coastline_km must be greater than 0 (got {})",
                self.stats.coastline_km
            )));
        }

        if !(-90.0..=90.0).contains(&self.map.center_lat) {
            return Err(Error::config_validation(format!(
                "center_lat ({}) must be within [-90, 90]",
                self.map.center_lat
            )));
        }

        if !(-180.0..=180.0).contains(&self.map.center_lon) {
            return Err(Error::config_validation(format!(
                "center_lon ({}) must be within [-180, 180]",
                self.map.center_lon
            )));
        }

        if self.map.zoom > 19 {
            return Err(Error::config_validation(format!(
                "zoom ({}) must be at most 19",
                self.map.zoom
            )));
        }

        if self.map.line_weight == 0 {
            return Err(Error::config_validation(
                "line_weight must be greater than 0",
            ));
        }

        if self.toc.default_region.trim().is_empty() {
            return Err(Error::config_validation("default_region must not be empty"));
        }

        let index = &self.paths.journal_index;
        if index.is_empty() || index.to_ascii_lowercase().ends_with(".md") {
            return Err(Error::config_validation(format!(
                "journal_index ({index:?}) must be a non-markdown file name"
            )));
        }

        Ok(())
    }

    /// Resolve all configured locations against the project root.
    #[must_use]
    pub fn resolve_paths(&self, root: &Path) -> ResolvedPaths {
        let journals_dir = root.join(&self.paths.journals_dir);
        ResolvedPaths {
            root: root.to_path_buf(),
            tracks_dir: root.join(&self.paths.tracks_dir),
            manifest: root.join(&self.paths.manifest),
            journal_index: journals_dir.join(&self.paths.journal_index),
            journals_dir,
            toc: root.join(&self.paths.toc),
            map_file: root.join(&self.paths.map_dir).join(&self.map.output_file),
        }
    }
}
