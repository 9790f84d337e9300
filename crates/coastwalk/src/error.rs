//! Error types for coastwalk.
//!
//! Missing inputs are not errors here: stages see them as `Ok(None)` or an
//! empty result and log a warning. What remains are genuine failures, most
//! notably malformed structured files, which abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for coastwalk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Malformed Input Errors ===
    /// The walk manifest exists but could not be parsed.
    #[error("malformed manifest {path}: {source}")]
    ManifestParse {
        /// Path to the manifest file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The table-of-contents file exists but could not be parsed.
    #[error("malformed table of contents {path}: {source}")]
    TocParse {
        /// Path to the TOC file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A track file could not be parsed.
    #[error("malformed track file {path}: {message}")]
    TrackParse {
        /// Path to the track file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a file that exists.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that couldn't be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Path that couldn't be written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// YAML serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for coastwalk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a track parse error.
    #[must_use]
    pub fn track_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TrackParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error comes from an input file that exists but is malformed.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::ManifestParse { .. } | Self::TocParse { .. } | Self::TrackParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml_error() -> serde_yaml::Error {
        serde_yaml::from_str::<Vec<String>>("walks: [unclosed").unwrap_err()
    }

    #[test]
    fn test_track_parse_display() {
        let err = Error::track_parse("gpx/a.gpx", "missing lat attribute");
        let msg = err.to_string();
        assert!(msg.contains("gpx/a.gpx"));
        assert!(msg.contains("missing lat attribute"));
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("zoom out of range");
        assert_eq!(
            err.to_string(),
            "invalid configuration: zoom out of range"
        );
    }

    #[test]
    fn test_is_malformed() {
        let err = Error::ManifestParse {
            path: PathBuf::from("data/walks.yaml"),
            source: yaml_error(),
        };
        assert!(err.is_malformed());

        let err = Error::TocParse {
            path: PathBuf::from("data/toc.yml"),
            source: yaml_error(),
        };
        assert!(err.is_malformed());
        assert!(Error::track_parse("x.gpx", "bad").is_malformed());
        assert!(!Error::config_validation("bad").is_malformed());
    }

    #[test]
    fn test_manifest_parse_display_names_path() {
        let err = Error::ManifestParse {
            path: PathBuf::from("data/walks.yaml"),
            source: yaml_error(),
        };
        assert!(err.to_string().contains("data/walks.yaml"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_yaml_error() {
        let err: Error = yaml_error().into();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_file_write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::FileWrite {
            path: PathBuf::from("map/index.html"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("map/index.html"));
        assert!(msg.contains("access denied"));
    }
}
