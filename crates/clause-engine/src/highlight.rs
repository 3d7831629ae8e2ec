//! Highlight composer
//!
//! Turns the display document into a flat sequence of [`Segment`]s for a
//! rendering layer. The sequence is lazy and recomputed from the current
//! store on every call, so it always reflects the latest decisions.

use crate::format::strip_formatting;
use crate::markers::{self, Marker, MarkerKind};
use crate::matcher::NameMatcher;
use crate::regions::{LineSpan, RegionTracker};
use crate::store::FindingStore;
use clause_types::{FindingId, FindingStatus};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::Split;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentKind {
    Plain,
    /// Clickable; `finding` is `None` when no finding matches the label
    MissingMarker {
        finding: Option<FindingId>,
        status: FindingStatus,
    },
    CorruptedMarker {
        finding: Option<FindingId>,
        status: FindingStatus,
    },
    /// Hover only
    CorruptedRegion { clause_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// 0-based line of the display document
    pub line: usize,
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.kind,
            SegmentKind::MissingMarker { .. } | SegmentKind::CorruptedMarker { .. }
        )
    }
}

pub struct Highlighter<'a> {
    text: &'a str,
    regions: &'a RegionTracker,
    store: &'a FindingStore,
    matcher: &'a dyn NameMatcher,
}

impl<'a> Highlighter<'a> {
    pub fn new(
        text: &'a str,
        regions: &'a RegionTracker,
        store: &'a FindingStore,
        matcher: &'a dyn NameMatcher,
    ) -> Self {
        Self {
            text,
            regions,
            store,
            matcher,
        }
    }

    pub fn segments(&self) -> Segments<'a> {
        Segments {
            lines: self.text.split('\n'),
            line_no: 0,
            offset: 0,
            pending: VecDeque::new(),
            regions: self.regions,
            store: self.store,
            matcher: self.matcher,
        }
    }
}

/// Lazy segment iterator; clone it to restart from the current position
#[derive(Clone)]
pub struct Segments<'a> {
    lines: Split<'a, char>,
    line_no: usize,
    /// Character offset of the next line
    offset: usize,
    pending: VecDeque<Segment>,
    regions: &'a RegionTracker,
    store: &'a FindingStore,
    matcher: &'a dyn NameMatcher,
}

impl Segments<'_> {
    fn compose_line(&mut self, line: &str) {
        let number = self.line_no;
        let len = line.chars().count();
        let span = LineSpan {
            number,
            start: self.offset,
            end: self.offset + len,
        };
        self.line_no += 1;
        self.offset += len + 1;

        let regions = self.regions;
        let found = markers::parse_line(line, number);
        if !found.is_empty() {
            let mut cursor = 0;
            for marker in &found {
                self.push_plain(number, &line[cursor..marker.start]);
                let kind = self.marker_kind(marker, line);
                self.pending.push_back(Segment {
                    line: number,
                    kind,
                    text: strip_formatting(&marker.token).into_owned(),
                });
                cursor = marker.end;
            }
            self.push_plain(number, &line[cursor..]);
        } else if let Some(split) = regions.split_line(line, span) {
            self.push_plain(number, split.before);
            let within = strip_formatting(split.within);
            if !within.is_empty() {
                self.pending.push_back(Segment {
                    line: number,
                    kind: SegmentKind::CorruptedRegion {
                        clause_name: split.region.clause_name.clone(),
                    },
                    text: within.into_owned(),
                });
            }
            self.push_plain(number, split.after);
        }

        // every line yields at least one segment
        if self.pending.iter().all(|s| s.line != number) {
            self.pending.push_back(Segment {
                line: number,
                kind: SegmentKind::Plain,
                text: strip_formatting(line).into_owned(),
            });
        }
    }

    fn push_plain(&mut self, line: usize, raw: &str) {
        let text = strip_formatting(raw);
        if !text.is_empty() {
            self.pending.push_back(Segment {
                line,
                kind: SegmentKind::Plain,
                text: text.into_owned(),
            });
        }
    }

    fn marker_kind(&self, marker: &Marker, line: &str) -> SegmentKind {
        let finding = self.store.finding_for_marker(marker, line, self.matcher);
        let id = finding.map(|f| f.id);
        let status = finding.map(|f| f.status).unwrap_or_default();
        match marker.kind {
            MarkerKind::Missing => SegmentKind::MissingMarker {
                finding: id,
                status,
            },
            MarkerKind::Corrupted => SegmentKind::CorruptedMarker {
                finding: id,
                status,
            },
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        loop {
            if let Some(segment) = self.pending.pop_front() {
                return Some(segment);
            }
            let line = self.lines.next()?;
            self.compose_line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::LooseMatcher;
    use crate::store::Decision;
    use clause_types::{ClauseAnalysis, Region};
    use pretty_assertions::assert_eq;

    fn kinds(segments: &[Segment]) -> Vec<(usize, &str)> {
        segments
            .iter()
            .map(|s| {
                let tag = match s.kind {
                    SegmentKind::Plain => "plain",
                    SegmentKind::MissingMarker { .. } => "missing",
                    SegmentKind::CorruptedMarker { .. } => "corrupted",
                    SegmentKind::CorruptedRegion { .. } => "region",
                };
                (s.line, tag)
            })
            .collect()
    }

    #[test]
    fn test_markers_become_interactive_segments() {
        let text = "<<BOLD>>JUDGMENT<</BOLD>>\nArgued on: [MISSING: Argument Date - Enter date]";
        let mut store = FindingStore::bootstrap(text, &ClauseAnalysis::default(), &LooseMatcher);
        let regions = RegionTracker::default();

        let segments: Vec<_> = Highlighter::new(text, &regions, &store, &LooseMatcher)
            .segments()
            .collect();
        assert_eq!(kinds(&segments), vec![(0, "plain"), (1, "plain"), (1, "missing")]);
        assert_eq!(segments[0].text, "JUDGMENT");
        assert_eq!(segments[1].text, "Argued on: ");
        assert_eq!(
            segments[2].kind,
            SegmentKind::MissingMarker {
                finding: Some(1),
                status: FindingStatus::Pending
            }
        );

        store.apply(1, &Decision::Reject).unwrap();
        let rerendered: Vec<_> = Highlighter::new(text, &regions, &store, &LooseMatcher)
            .segments()
            .collect();
        assert_eq!(
            rerendered[2].kind,
            SegmentKind::MissingMarker {
                finding: Some(1),
                status: FindingStatus::Rejected
            }
        );
    }

    #[test]
    fn test_region_line_splits_in_three() {
        let text = "Title\nCOURT OF A##EAL OF SRI LANKA\n";
        let regions = RegionTracker::new(vec![Region {
            clause_name: "Court Title".into(),
            text: None,
            start: 15,
            end: 21,
        }]);
        let store = FindingStore::default();

        let segments: Vec<_> = Highlighter::new(text, &regions, &store, &LooseMatcher)
            .segments()
            .collect();
        assert_eq!(
            kinds(&segments),
            vec![(0, "plain"), (1, "plain"), (1, "region"), (1, "plain"), (2, "plain")]
        );
        assert_eq!(segments[2].text, "A##EAL");
        assert_eq!(segments[4].text, "");
    }

    #[test]
    fn test_marker_takes_precedence_over_region() {
        let text = "No: [CORRUPTED: ###] and more";
        let regions = RegionTracker::new(vec![Region {
            clause_name: "Tail".into(),
            text: None,
            start: 21,
            end: 29,
        }]);
        let store = FindingStore::default();
        let segments: Vec<_> = Highlighter::new(text, &regions, &store, &LooseMatcher)
            .segments()
            .collect();
        assert_eq!(kinds(&segments), vec![(0, "plain"), (0, "corrupted"), (0, "plain")]);
        assert_eq!(
            segments[1].kind,
            SegmentKind::CorruptedMarker {
                finding: None,
                status: FindingStatus::Pending
            }
        );
    }

    #[test]
    fn test_segments_restart_by_cloning() {
        let text = "a\nb\nc";
        let regions = RegionTracker::default();
        let store = FindingStore::default();
        let highlighter = Highlighter::new(text, &regions, &store, &LooseMatcher);

        let mut segments = highlighter.segments();
        segments.next();
        let rest: Vec<_> = segments.clone().map(|s| s.text).collect();
        assert_eq!(rest, vec!["b", "c"]);
        assert_eq!(segments.count(), 2);
        assert_eq!(highlighter.segments().count(), 3);
    }

    #[test]
    fn test_segment_wire_shape() {
        let segment = Segment {
            line: 2,
            kind: SegmentKind::MissingMarker {
                finding: Some(4),
                status: FindingStatus::Edited,
            },
            text: "[MISSING: Costs]".into(),
        };
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["kind"]["type"], "missing_marker");
        assert_eq!(json["kind"]["status"], "edited");
        assert_eq!(json["kind"]["finding"], 4);
        assert!(segment.is_interactive());
    }
}
