//! Side-by-side comparison of the display document and the working copy
//!
//! Lines are compared by set membership, not aligned. A line is new when no
//! identical line exists anywhere in the original, so moves and duplicates
//! go unnoticed.

use crate::format::strip_formatting;
use crate::markers::{self, MarkerKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", content = "marker", rename_all = "snake_case")]
pub enum LineFlag {
    Unchanged,
    /// Still carries a defect marker
    Defect(MarkerKind),
    /// Not present anywhere in the original
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// 1-based, for display
    pub number: usize,
    pub text: String,
    pub flag: LineFlag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: Vec<DiffLine>,
    pub right: Vec<DiffLine>,
}

impl Comparison {
    pub fn new_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.right.iter().filter(|l| l.flag == LineFlag::New)
    }

    pub fn defect_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.left
            .iter()
            .filter(|l| matches!(l.flag, LineFlag::Defect(_)))
    }
}

pub fn diff(original: &str, modified: &str) -> Comparison {
    let original_lines: HashSet<&str> = original.split('\n').collect();

    let left = original
        .split('\n')
        .enumerate()
        .map(|(idx, line)| DiffLine {
            number: idx + 1,
            text: strip_formatting(line).into_owned(),
            flag: markers::first_marker_kind(line)
                .map(LineFlag::Defect)
                .unwrap_or(LineFlag::Unchanged),
        })
        .collect();

    let right = modified
        .split('\n')
        .enumerate()
        .map(|(idx, line)| {
            let flag = match markers::first_marker_kind(line) {
                Some(kind) => LineFlag::Defect(kind),
                None if !line.trim().is_empty() && !original_lines.contains(line) => LineFlag::New,
                None => LineFlag::Unchanged,
            };
            DiffLine {
                number: idx + 1,
                text: strip_formatting(line).into_owned(),
                flag,
            }
        })
        .collect();

    Comparison { left, right }
}
