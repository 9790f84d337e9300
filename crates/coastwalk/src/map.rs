//! Map rendering and distance statistics.
//!
//! Every walk in the manifest whose track file can be read becomes a polyline
//! on a standalone Leaflet page. One unreadable or missing track never stops
//! the others from being measured and drawn.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{Config, MapConfig, ResolvedPaths};
use crate::error::Result;
use crate::fsutil;
use crate::geo_utils::{self, GpsPoint};
use crate::gpx::Track;
use crate::manifest::{Manifest, WalkRecord};
use crate::naming;

/// What happened to one walk while measuring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStatus {
    /// Drawn and counted.
    Rendered,
    /// The track file doesn't exist.
    MissingTrack,
    /// The track file has no track points.
    NoCoordinates,
    /// The track file couldn't be read or parsed.
    Unreadable(String),
}

/// Per-walk measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkStat {
    /// Walk display name.
    pub name: String,
    /// Track file reference.
    pub gpx: String,
    /// Length in kilometers, if the walk was rendered.
    pub distance_km: Option<f64>,
    /// Whether the walk was added in the current run.
    pub is_new: bool,
    /// Outcome.
    pub status: WalkStatus,
}

/// A walk ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPath {
    /// Walk display name.
    pub name: String,
    /// Popup HTML.
    pub popup: String,
    /// Line colour.
    pub color: String,
    /// Track geometry.
    #[serde(serialize_with = "serialize_lat_lon")]
    pub points: Vec<GpsPoint>,
}

/// Distances for every walk in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measurement {
    /// One entry per manifest record, in manifest order.
    pub walks: Vec<WalkStat>,
    /// Sum of rendered walk lengths.
    pub total_km: f64,
    /// Reference coastline length.
    pub coastline_km: f64,
    /// Drawable paths, in manifest order.
    #[serde(skip)]
    pub paths: Vec<MapPath>,
}

impl Measurement {
    /// Fraction of the reference coastline walked.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.coastline_km > 0.0 {
            self.total_km / self.coastline_km
        } else {
            0.0
        }
    }

    /// Number of walks drawn.
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.count(|status| matches!(status, WalkStatus::Rendered))
    }

    /// Number of walks skipped for any reason.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.walks.len() - self.rendered()
    }

    fn count(&self, pred: impl Fn(&WalkStatus) -> bool) -> usize {
        self.walks.iter().filter(|w| pred(&w.status)).count()
    }
}

/// Load and measure every walk in `manifest`.
///
/// `new_keys` holds the track keys added in the current run; those walks are
/// drawn in the "new" colour.
#[must_use]
pub fn measure(
    paths: &ResolvedPaths,
    config: &Config,
    manifest: &Manifest,
    new_keys: &HashSet<String>,
) -> Measurement {
    let mut measurement = Measurement {
        coastline_km: config.stats.coastline_km,
        ..Measurement::default()
    };

    for walk in &manifest.walks {
        let is_new = new_keys.contains(&walk.key());
        let track_path = paths.resolve(walk.key());

        let status = match Track::load(&track_path) {
            Ok(Some(track)) if !track.is_empty() => {
                let km = geo_utils::path_length_km(&track.points);
                measurement.total_km += km;
                info!("added: {} - {km:.2} km", walk.name);
                measurement
                    .paths
                    .push(map_path(walk, track.points, is_new, &config.map));
                measurement.walks.push(WalkStat {
                    name: walk.name.clone(),
                    gpx: walk.gpx.clone(),
                    distance_km: Some(km),
                    is_new,
                    status: WalkStatus::Rendered,
                });
                continue;
            }
            Ok(Some(_)) => {
                warn!("no coordinates found for: {}", walk.name);
                WalkStatus::NoCoordinates
            }
            Ok(None) => {
                warn!("track file not found: {}", track_path.display());
                WalkStatus::MissingTrack
            }
            Err(err) => {
                error!("skipping {}: {err}", walk.name);
                WalkStatus::Unreadable(err.to_string())
            }
        };
        measurement.walks.push(WalkStat {
            name: walk.name.clone(),
            gpx: walk.gpx.clone(),
            distance_km: None,
            is_new,
            status,
        });
    }

    debug!(
        "measured {} walk(s), {} rendered, {:.2} km total",
        measurement.walks.len(),
        measurement.rendered(),
        measurement.total_km
    );
    measurement
}

fn map_path(walk: &WalkRecord, points: Vec<GpsPoint>, is_new: bool, map: &MapConfig) -> MapPath {
    let color = if is_new { &map.new_color } else { &map.known_color };
    MapPath {
        name: walk.name.clone(),
        popup: popup_html(&walk.name, &walk.journal),
        color: color.clone(),
        points,
    }
}

/// Popup for a walk: its name and a site-relative link to its journal.
#[must_use]
pub fn popup_html(name: &str, journal: &str) -> String {
    let journal = naming::normalize_ref(journal);
    let url = format!("/{}", journal.trim_start_matches('/'));
    format!(
        "<b>{}</b><br><a href='{}' target='_blank'>View Journal</a>",
        escape_html(name),
        escape_html(&url)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn serialize_lat_lon<S>(points: &[GpsPoint], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(points.iter().map(GpsPoint::lat_lon))
}

/// Data embedded in the page script.
#[derive(Debug, Serialize)]
struct MapData<'a> {
    center: [f64; 2],
    zoom: u8,
    tile_url: &'a str,
    attribution: &'a str,
    weight: u32,
    walks: &'a [MapPath],
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Coastal Walks</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
html, body { height: 100%; margin: 0; }
#map { position: absolute; top: 0; bottom: 0; left: 0; right: 0; }
</style>
</head>
<body>
<div id="map"></div>
<!-- __SUMMARY__ -->
<script>
const data = __DATA__;
const map = L.map("map").setView(data.center, data.zoom);
L.tileLayer(data.tile_url, { attribution: data.attribution, maxZoom: 19 }).addTo(map);
for (const walk of data.walks) {
  L.polyline(walk.points, { color: walk.color, weight: data.weight })
    .bindPopup(walk.popup)
    .addTo(map);
}
</script>
</body>
</html>
"#;

/// Render the standalone map page.
///
/// # Errors
///
/// Returns an error if the path data can't be serialized.
pub fn render_html(map: &MapConfig, measurement: &Measurement) -> Result<String> {
    let data = MapData {
        center: [map.center_lat, map.center_lon],
        zoom: map.zoom,
        tile_url: &map.tile_url,
        attribution: &map.tile_attribution,
        weight: map.line_weight,
        walks: &measurement.paths,
    };
    // Keep "</script>" in names or popups from closing the script element.
    let json = serde_json::to_string(&data)?.replace("</", "<\\/");

    let summary = format!(
        "{} walk(s), {:.2} km, {:.2}% of {} km",
        measurement.rendered(),
        measurement.total_km,
        measurement.fraction() * 100.0,
        measurement.coastline_km
    );

    Ok(PAGE_TEMPLATE
        .replace("__SUMMARY__", &summary)
        .replace("__DATA__", &json))
}

/// Measure every walk in `manifest` and write the map page.
///
/// # Errors
///
/// Returns an error if the page can't be rendered or written. Problems with
/// individual track files are logged and reflected in the result instead.
pub fn render(
    paths: &ResolvedPaths,
    config: &Config,
    manifest: &Manifest,
    new_walks: &[WalkRecord],
) -> Result<Measurement> {
    let new_keys: HashSet<String> = new_walks.iter().map(WalkRecord::key).collect();
    let measurement = measure(paths, config, manifest, &new_keys);

    let html = render_html(&config.map, &measurement)?;
    fsutil::write_file(&paths.map_file, &html)?;
    info!("map saved to {}", paths.map_file.display());

    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::path::Path;

    fn gpx(points: &[(f64, f64)]) -> String {
        let mut xml = String::from("<gpx version=\"1.1\"><trk><trkseg>");
        for (lat, lon) in points {
            let _ = write!(xml, "<trkpt lat=\"{lat}\" lon=\"{lon}\"/>");
        }
        xml.push_str("</trkseg></trk></gpx>");
        xml
    }

    fn project(tracks: &[(&str, Option<String>)]) -> (tempfile::TempDir, ResolvedPaths, Manifest) {
        let dir = tempfile::tempdir().unwrap();
        let paths = Config::default().resolve_paths(dir.path());
        let mut manifest = Manifest::default();
        for (stem, contents) in tracks {
            let track_ref = format!("gpx/{stem}.gpx");
            if let Some(contents) = contents {
                fsutil::write_file(&paths.resolve(&track_ref), contents).unwrap();
            }
            manifest.append(vec![WalkRecord::for_track(&track_ref, Path::new("journals"))]);
        }
        (dir, paths, manifest)
    }

    const FIVE_KM: [(f64, f64); 3] = [(56.0, -3.0), (56.0225, -3.0), (56.045, -3.0)];

    #[test]
    fn test_popup_html() {
        assert_eq!(
            popup_html("North Berwick", "journals/north-berwick.md"),
            "<b>North Berwick</b><br><a href='/journals/north-berwick.md' target='_blank'>View Journal</a>"
        );
        assert!(popup_html("Fish & Chips <Run>", "j.md").contains("Fish &amp; Chips &lt;Run&gt;"));
        assert!(popup_html("Elie", "/srv/journals/elie.md").contains("href='/srv/journals/elie.md'"));
    }

    #[test]
    fn test_absolute_track_ref_is_measured() {
        let (_dir, paths, _) = project(&[]);
        let elsewhere = tempfile::tempdir().unwrap();
        let track = elsewhere.path().join("crail.gpx");
        fsutil::write_file(&track, &gpx(&FIVE_KM)).unwrap();

        let mut manifest = Manifest::default();
        manifest.append(vec![WalkRecord::for_track(
            &track.to_string_lossy(),
            Path::new("journals"),
        )]);
        assert!(Path::new(&manifest.walks[0].gpx).is_absolute());

        let measurement = measure(&paths, &Config::default(), &manifest, &HashSet::new());
        assert_eq!(measurement.walks[0].status, WalkStatus::Rendered);
        assert!((measurement.total_km - 5.0).abs() < 0.1);
    }

    #[test]
    fn test_single_walk_five_km() {
        let (_dir, paths, manifest) = project(&[("dunbar", Some(gpx(&FIVE_KM)))]);
        let config = Config::default();

        let measurement = render(&paths, &config, &manifest, &[]).unwrap();
        assert_eq!(measurement.rendered(), 1);
        assert_eq!(measurement.paths.len(), 1);
        assert!((measurement.total_km - 5.0).abs() < 0.1);
        assert!((measurement.fraction() - measurement.total_km / 19_000.0).abs() < 1e-12);

        let html = std::fs::read_to_string(&paths.map_file).unwrap();
        assert!(html.contains("<b>Dunbar<\\/b>"));
        assert_eq!(html.matches("\"popup\":").count(), 1);
        assert!(html.contains("\"center\":[54.5,-3.0]"));
    }

    #[test]
    fn test_missing_track_is_skipped() {
        crate::logging::init_test_logging();
        let (_dir, paths, manifest) = project(&[
            ("aberdour", Some(gpx(&FIVE_KM))),
            ("ghost", None),
            ("elie", Some(gpx(&FIVE_KM[..2]))),
        ]);

        let measurement = render(&paths, &Config::default(), &manifest, &[]).unwrap();
        assert_eq!(measurement.rendered(), 2);
        assert_eq!(measurement.skipped(), 1);
        assert_eq!(measurement.walks[1].status, WalkStatus::MissingTrack);
        assert!(measurement.walks[1].distance_km.is_none());
        assert!(paths.map_file.exists());
    }

    #[test]
    fn test_empty_and_broken_tracks_do_not_count() {
        let (_dir, paths, manifest) = project(&[
            ("empty", Some("<gpx version=\"1.1\"></gpx>".to_string())),
            ("broken", Some("<gpx><trk></gpx>".to_string())),
            ("good", Some(gpx(&FIVE_KM))),
        ]);

        let measurement = measure(&paths, &Config::default(), &manifest, &HashSet::new());
        assert_eq!(measurement.walks[0].status, WalkStatus::NoCoordinates);
        assert!(matches!(measurement.walks[1].status, WalkStatus::Unreadable(_)));
        assert_eq!(measurement.walks[2].status, WalkStatus::Rendered);
        assert!((measurement.total_km - 5.0).abs() < 0.1);
    }

    #[test]
    fn test_single_point_track_is_zero_length() {
        let (_dir, paths, manifest) = project(&[("stop", Some(gpx(&FIVE_KM[..1])))]);

        let measurement = measure(&paths, &Config::default(), &manifest, &HashSet::new());
        assert_eq!(measurement.rendered(), 1);
        assert!(measurement.total_km.abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_walks_use_new_colour() {
        let (_dir, paths, manifest) = project(&[
            ("old", Some(gpx(&FIVE_KM))),
            ("fresh", Some(gpx(&FIVE_KM))),
        ]);
        let new_walks = vec![manifest.walks[1].clone()];

        let measurement = render(&paths, &Config::default(), &manifest, &new_walks).unwrap();
        assert_eq!(measurement.paths[0].color, "blue");
        assert_eq!(measurement.paths[1].color, "green");
        assert!(measurement.walks[1].is_new);
    }

    #[test]
    fn test_render_html_escapes_script_close() {
        let measurement = Measurement {
            paths: vec![MapPath {
                name: "</script>".to_string(),
                popup: String::new(),
                color: "blue".to_string(),
                points: vec![GpsPoint::new(1.0, 2.0)],
            }],
            coastline_km: 19_000.0,
            ..Measurement::default()
        };

        let html = render_html(&MapConfig::default(), &measurement).unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("\"points\":[[1.0,2.0]]"));
    }

    #[test]
    fn test_measurement_serializes_status() {
        let stat = WalkStat {
            name: "A".to_string(),
            gpx: "gpx/a.gpx".to_string(),
            distance_km: None,
            is_new: false,
            status: WalkStatus::MissingTrack,
        };
        let json = serde_json::to_string(&stat).unwrap();
        assert!(json.contains("\"status\":\"missing_track\""));
    }
}
