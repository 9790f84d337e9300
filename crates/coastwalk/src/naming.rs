//! Derived names and references.
//!
//! Display names, journal file names and manifest keys are all computed from
//! a track file's stem or path, so the same file always maps to the same
//! record, journal and TOC entry.

use std::path::Path;

/// Characters in a file stem that separate words.
const SEPARATORS: [char; 2] = ['-', '_'];

/// Human-readable walk name from a file stem.
///
/// Separators become spaces and every word is title-cased: a letter that
/// follows another letter is lower-cased, any other letter is upper-cased.
///
/// ```
/// use coastwalk::naming::display_name;
///
/// assert_eq!(display_name("s-queensferry-to-boness"), "S Queensferry To Boness");
/// ```
#[must_use]
pub fn display_name(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut prev_cased = false;
    for c in stem.chars() {
        let c = if SEPARATORS.contains(&c) { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

/// Canonical form of a manifest path reference: forward slashes, no `.`
/// components, no empty segments, and `..` collapsed against the segment
/// before it. An absolute reference keeps its leading `/`.
#[must_use]
pub fn normalize_ref(reference: &str) -> String {
    let absolute = reference.starts_with(['/', '\\']);
    let mut parts: Vec<&str> = Vec::new();
    for part in reference.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push(part);
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Canonical reference for `path` relative to `root`, falling back to the
/// absolute path itself when it isn't under `root`.
#[must_use]
pub fn relative_ref(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize_ref(&relative.to_string_lossy())
}

/// File stem of a track reference such as `gpx/north-berwick.gpx`.
#[must_use]
pub fn track_stem(track_ref: &str) -> Option<String> {
    Path::new(&normalize_ref(track_ref))
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// Journal file name for a track stem.
#[must_use]
pub fn journal_file_name(stem: &str) -> String {
    format!("{stem}.md")
}

/// Manifest journal reference for a track stem, e.g. `journals/<stem>.md`.
#[must_use]
pub fn journal_ref(journals_dir: &Path, stem: &str) -> String {
    let dir = normalize_ref(&journals_dir.to_string_lossy());
    if dir.is_empty() {
        journal_file_name(stem)
    } else {
        format!("{dir}/{}", journal_file_name(stem))
    }
}
