//! Inline defect markers
//!
//! The inference service rewrites the extracted text so that every defect it
//! found is visible in place:
//!
//! - `[MISSING: Argument Date - Enter date]` where a clause is absent
//! - `[CORRUPTED: SC/###/LA 184/2023]` where text is unreadable
//!
//! Parsing is per line. A marker never spans a line break, and anything that
//! does not match the grammar is plain text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref MARKER: Regex = Regex::new(r"\[(MISSING|CORRUPTED):\s*([^\]\n]*)\]").unwrap();
}

/// Separator between a missing-clause label and its free-text hint
pub const HINT_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Missing,
    Corrupted,
}

impl MarkerKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            MarkerKind::Missing => "MISSING",
            MarkerKind::Corrupted => "CORRUPTED",
        }
    }
}

/// A marker found on one line of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// 0-based line number
    pub line: usize,
    /// Byte range of the whole token within the line
    pub start: usize,
    pub end: usize,
    /// The literal token, brackets included
    pub token: String,
    /// Undecorated payload
    pub payload: String,
}

impl Marker {
    /// Matching key into the finding store. For missing markers this is the
    /// part of the payload before the hint separator.
    pub fn label(&self) -> &str {
        match self.kind {
            MarkerKind::Missing => split_label(&self.payload).0,
            MarkerKind::Corrupted => &self.payload,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self.kind {
            MarkerKind::Missing => split_label(&self.payload).1,
            MarkerKind::Corrupted => None,
        }
    }
}

/// Split `"Argument Date - Enter date"` into the label and the hint
pub fn split_label(payload: &str) -> (&str, Option<&str>) {
    match payload.split_once(HINT_SEPARATOR) {
        Some((label, hint)) => {
            let hint = hint.trim();
            (label.trim(), (!hint.is_empty()).then_some(hint))
        }
        None => (payload.trim(), None),
    }
}

/// All markers on a single line, left to right
pub fn parse_line(line: &str, line_no: usize) -> Vec<Marker> {
    MARKER
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = match caps.get(1)?.as_str() {
                "MISSING" => MarkerKind::Missing,
                _ => MarkerKind::Corrupted,
            };
            let payload = caps.get(2)?.as_str().trim();
            if payload.is_empty() {
                return None;
            }
            Some(Marker {
                kind,
                line: line_no,
                start: whole.start(),
                end: whole.end(),
                token: whole.as_str().to_string(),
                payload: payload.to_string(),
            })
        })
        .collect()
}

/// All markers in a document, in reading order
pub fn scan(text: &str) -> Vec<Marker> {
    text.split('\n')
        .enumerate()
        .flat_map(|(line_no, line)| parse_line(line, line_no))
        .collect()
}

/// Cheap check used by the differ
pub fn has_marker(line: &str) -> bool {
    !parse_line(line, 0).is_empty()
}

/// Kind of the first marker on the line, if any
pub fn first_marker_kind(line: &str) -> Option<MarkerKind> {
    parse_line(line, 0).first().map(|m| m.kind)
}
