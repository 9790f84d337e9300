//! `coastwalk` - Track progress along the coast
//!
//! This library scans a folder of GPX tracks into a YAML manifest of walks,
//! creates markdown journal stubs and a grouped table of contents, and draws
//! every walk on a standalone map with the total distance covered.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod geo_utils;
pub mod gpx;
pub mod ingest;
pub mod journal;
pub mod logging;
pub mod manifest;
pub mod map;
pub mod naming;
pub mod pipeline;
pub mod toc;

pub use config::{Config, ResolvedPaths};
pub use error::{Error, Result};
pub use geo_utils::GpsPoint;
pub use logging::init_logging;
pub use manifest::{Manifest, ManifestStore, WalkRecord};
pub use map::Measurement;
pub use pipeline::RunReport;
