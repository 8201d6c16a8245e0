//! Filename classification: artifact kind and candidate group inference.
//!
//! All rules are ordered, first-match-wins. Rule order is part of the
//! contract and is exercised by tests; reordering changes results against
//! the same roster.

use serde::{Deserialize, Serialize};

use crate::roster::Roster;

/// Keywords that mark a file as a poster. Checked before the presentation
/// keywords, so a filename containing both classifies as a poster.
const POSTER_KEYWORDS: &[&str] = &["poster", "posters"];

/// Keywords that mark a file as a presentation / slide deck.
const PRESENTATION_KEYWORDS: &[&str] = &["presentation", "presentations", "slides", "slide", "lit"];

/// Characters treated as segment separators in filenames.
const SEPARATORS: &[char] = &['_', '-', '.', ' '];

/// What kind of artifact a filename denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Poster,
    Presentation,
    Unknown,
}

/// Result of classifying a single filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: FileKind,
    /// Best-guess group label, prior to confirming it against real records.
    pub candidate_group: Option<String>,
}

/// Classifies a filename into an artifact kind and a candidate group label.
pub fn classify(filename: &str, roster: &Roster) -> Classification {
    let lower = filename.to_lowercase();

    let kind = if POSTER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FileKind::Poster
    } else if PRESENTATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FileKind::Presentation
    } else {
        FileKind::Unknown
    };

    Classification {
        kind,
        candidate_group: infer_group(filename, roster),
    }
}

/// Returns the leading token of a filename: everything before the first
/// separator. By convention this is the uploader's given name.
pub fn leading_token(filename: &str) -> &str {
    filename
        .split(SEPARATORS)
        .next()
        .unwrap_or(filename)
}

/// Infers a candidate group label from a filename.
///
/// Rules, in order:
/// 1. Case-insensitive substring match against the roster's canonical labels.
/// 2. Case-insensitive substring match against the roster's alias patterns.
/// 3. Fallback: split the stem on separators, drop the first segment
///    (presumed person name) and the last (presumed file metadata), and
///    return the first interior segment longer than 3 characters that is
///    not purely numeric, title-cased.
fn infer_group(filename: &str, roster: &Roster) -> Option<String> {
    let lower = filename.to_lowercase();

    for label in roster.groups() {
        if lower.contains(&label.to_lowercase()) {
            return Some(label.clone());
        }
    }

    for alias in roster.aliases() {
        if lower.contains(&alias.pattern.to_lowercase()) {
            return Some(alias.canonical.clone());
        }
    }

    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _ext)| stem);
    let segments: Vec<&str> = stem.split(SEPARATORS).filter(|s| !s.is_empty()).collect();
    if segments.len() > 2 {
        for segment in &segments[1..segments.len() - 1] {
            if segment.len() > 3 && !segment.chars().all(|c| c.is_ascii_digit()) {
                return Some(title_case(segment));
            }
        }
    }

    None
}

/// Uppercases the first character and lowercases the rest.
fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
