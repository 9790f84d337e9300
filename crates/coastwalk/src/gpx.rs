//! GPS exchange format (GPX) track reader.
//!
//! Only track points are read: every `trkpt` of every `trkseg` of every `trk`
//! is concatenated in document order into one flat path. Routes, waypoints
//! and point metadata (elevation, time) are ignored.

use std::path::Path;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use thiserror::Error;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fsutil;
use crate::geo_utils::GpsPoint;

/// Why a GPX document couldn't be read.
#[derive(Error, Debug)]
pub enum GpxError {
    /// The XML itself is malformed.
    #[error("XML error at byte {position}: {source}")]
    Xml {
        /// Byte offset the reader had reached.
        position: usize,
        /// The underlying error.
        #[source]
        source: quick_xml::Error,
    },

    /// An element's attributes are malformed.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    /// The document has no `<gpx>` root element.
    #[error("not a GPX document")]
    NotGpx,

    /// A track point lacks `lat` or `lon`.
    #[error("track point {index} is missing its {attribute} attribute")]
    MissingCoordinate {
        /// Zero-based index of the point in the track.
        index: usize,
        /// The missing attribute name.
        attribute: &'static str,
    },

    /// A track point coordinate isn't a valid number in range.
    #[error("track point {index} has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinate {
        /// Zero-based index of the point in the track.
        index: usize,
        /// Raw latitude text.
        lat: String,
        /// Raw longitude text.
        lon: String,
    },
}

/// The geometry of one track file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    /// All track points, concatenated across tracks and segments.
    pub points: Vec<GpsPoint>,
    /// Number of `trk` elements.
    pub tracks: usize,
    /// Number of `trkseg` elements.
    pub segments: usize,
}

impl Track {
    /// Parse a GPX document.
    ///
    /// # Errors
    ///
    /// Returns a [`GpxError`] if the XML is malformed, the root isn't `gpx`,
    /// or a track point has missing or invalid coordinates.
    pub fn parse(xml: &str) -> std::result::Result<Self, GpxError> {
        let mut reader = XmlReader::from_str(xml);
        reader.trim_text(true);

        let mut track = Self::default();
        let mut seen_root = false;
        let mut track_depth = 0usize;

        loop {
            let event = reader.read_event().map_err(|source| GpxError::Xml {
                position: reader.buffer_position(),
                source,
            })?;
            match event {
                Event::Start(element) => {
                    if !seen_root {
                        check_root(&element)?;
                        seen_root = true;
                    }
                    match element.local_name().as_ref() {
                        b"trk" => {
                            track_depth += 1;
                            track.tracks += 1;
                        }
                        b"trkseg" if track_depth > 0 => track.segments += 1,
                        b"trkpt" if track_depth > 0 => {
                            track.push_point(&element, reader.buffer_position())?;
                        }
                        _ => {}
                    }
                }
                Event::Empty(element) => {
                    if !seen_root {
                        check_root(&element)?;
                        seen_root = true;
                    }
                    if track_depth > 0 && element.local_name().as_ref() == b"trkpt" {
                        track.push_point(&element, reader.buffer_position())?;
                    }
                }
                Event::End(element) => {
                    if element.local_name().as_ref() == b"trk" {
                        track_depth = track_depth.saturating_sub(1);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(GpxError::NotGpx);
        }
        Ok(track)
    }

    /// Read and parse a track file. Returns `None` if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrackParse`] if the file is not valid GPX, or an I/O
    /// error if it can't be read.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let Some(xml) = fsutil::read_optional(path)? else {
            return Ok(None);
        };
        let track = Self::parse(&xml).map_err(|err| Error::track_parse(path, err.to_string()))?;
        debug!(
            "{}: {} point(s) in {} track(s), {} segment(s)",
            path.display(),
            track.points.len(),
            track.tracks,
            track.segments
        );
        Ok(Some(track))
    }

    /// Whether the file held no track points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `position` is the reader's offset just past `element`.
    fn push_point(
        &mut self,
        element: &BytesStart<'_>,
        position: usize,
    ) -> std::result::Result<(), GpxError> {
        let index = self.points.len();
        let mut lat = None;
        let mut lon = None;
        for attr in element.attributes() {
            let attr = attr?;
            let value = attr
                .unescape_value()
                .map_err(|source| GpxError::Xml { position, source })?;
            match attr.key.local_name().as_ref() {
                b"lat" => lat = Some(value.into_owned()),
                b"lon" => lon = Some(value.into_owned()),
                _ => {}
            }
        }

        let lat = lat.ok_or(GpxError::MissingCoordinate {
            index,
            attribute: "lat",
        })?;
        let lon = lon.ok_or(GpxError::MissingCoordinate {
            index,
            attribute: "lon",
        })?;

        let point = match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
            (Ok(latitude), Ok(longitude)) => GpsPoint::new(latitude, longitude),
            _ => return Err(GpxError::InvalidCoordinate { index, lat, lon }),
        };
        if !point.is_valid() {
            return Err(GpxError::InvalidCoordinate { index, lat, lon });
        }
        self.points.push(point);
        Ok(())
    }
}

fn check_root(element: &BytesStart<'_>) -> std::result::Result<(), GpxError> {
    if element.local_name().as_ref() == b"gpx" {
        Ok(())
    } else {
        Err(GpxError::NotGpx)
    }
}
