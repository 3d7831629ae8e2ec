//! Corrupted ranges supplied by the classifier, independent of inline markers
//!
//! Region offsets are character offsets into the display document. Lines are
//! located by accumulating line lengths (plus one for each `\n`), so the same
//! arithmetic the classifier used on its side gives matching positions here.

use clause_types::Region;
use tracing::debug;

/// Character range of one line, excluding its line break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub number: usize,
    pub start: usize,
    pub end: usize,
}

/// Line offsets of a document, rebuilt only when the text changes
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    spans: Vec<LineSpan>,
}

impl LineIndex {
    pub fn build(text: &str) -> Self {
        let mut spans = Vec::new();
        let mut start = 0;
        for (number, line) in text.split('\n').enumerate() {
            let len = line.chars().count();
            spans.push(LineSpan {
                number,
                start,
                end: start + len,
            });
            start += len + 1;
        }
        Self { spans }
    }

    pub fn spans(&self) -> &[LineSpan] {
        &self.spans
    }

    pub fn line(&self, number: usize) -> Option<LineSpan> {
        self.spans.get(number).copied()
    }

    /// Line containing a character offset. An offset that falls on a line
    /// break belongs to the line it terminates.
    pub fn line_of(&self, offset: usize) -> Option<usize> {
        let idx = self.spans.partition_point(|span| span.end < offset);
        self.spans.get(idx).map(|span| span.number)
    }
}

/// A line cut around the region that won the split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSplit<'l, 'r> {
    pub before: &'l str,
    pub within: &'l str,
    pub after: &'l str,
    pub region: &'r Region,
}

#[derive(Debug, Clone, Default)]
pub struct RegionTracker {
    regions: Vec<Region>,
}

impl RegionTracker {
    pub fn new(regions: Vec<Region>) -> Self {
        let before = regions.len();
        let regions: Vec<Region> = regions.into_iter().filter(|r| !r.is_empty()).collect();
        if regions.len() != before {
            debug!(dropped = before - regions.len(), "ignoring empty corrupted regions");
        }
        Self { regions }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Every region overlapping `[line_start, line_end)`, in supplied order
    pub fn intersecting(&self, line_start: usize, line_end: usize) -> Vec<&Region> {
        self.regions
            .iter()
            .filter(|r| r.intersects(line_start, line_end))
            .collect()
    }

    /// Split a line around one intersecting region.
    ///
    /// Candidates are tried by descending start and the first one that leaves
    /// a non-empty highlighted slice wins; other regions on the same line are
    /// not rendered in this pass.
    pub fn split_line<'l>(&self, line: &'l str, span: LineSpan) -> Option<RegionSplit<'l, '_>> {
        let mut candidates = self.intersecting(span.start, span.end);
        candidates.sort_by(|a, b| b.start.cmp(&a.start));

        candidates.into_iter().find_map(|region| {
            let local_start = region.start.saturating_sub(span.start);
            let local_end = region.end.min(span.end) - span.start;
            if local_start >= local_end {
                return None;
            }
            let from = byte_offset(line, local_start);
            let to = byte_offset(line, local_end);
            Some(RegionSplit {
                before: &line[..from],
                within: &line[from..to],
                after: &line[to..],
                region,
            })
        })
    }
}

fn byte_offset(line: &str, char_idx: usize) -> usize {
    line.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(name: &str, start: usize, end: usize) -> Region {
        Region {
            clause_name: name.to_string(),
            text: None,
            start,
            end,
        }
    }

    #[test]
    fn test_line_index_accumulates_newlines() {
        let index = LineIndex::build("ab\ncde\n\nf");
        let spans = index.spans();
        assert_eq!(spans.len(), 4);
        assert_eq!((spans[1].start, spans[1].end), (3, 6));
        assert_eq!((spans[2].start, spans[2].end), (7, 7));
        assert_eq!((spans[3].start, spans[3].end), (8, 9));
        assert_eq!(index.line_of(4), Some(1));
        assert_eq!(index.line_of(6), Some(1));
        assert_eq!(index.line_of(8), Some(3));
    }

    #[test]
    fn test_line_index_counts_characters_not_bytes() {
        let index = LineIndex::build("Rs. 1,000 – paid\nnext");
        assert_eq!(index.line(1).unwrap().start, 17);
    }

    #[test]
    fn test_intersecting_uses_half_open_overlap() {
        let tracker = RegionTracker::new(vec![region("A", 0, 5), region("B", 5, 9)]);
        let hits: Vec<_> = tracker
            .intersecting(5, 12)
            .into_iter()
            .map(|r| r.clause_name.as_str())
            .collect();
        assert_eq!(hits, vec!["B"]);
    }

    #[test]
    fn test_split_line_into_three_parts() {
        let text = "Title\nCOURT OF A##EAL OF SRI LANKA";
        let index = LineIndex::build(text);
        let tracker = RegionTracker::new(vec![region("Court Title", 15, 22)]);
        let line = text.split('\n').nth(1).unwrap();

        let split = tracker.split_line(line, index.line(1).unwrap()).unwrap();
        assert_eq!(split.before, "COURT OF ");
        assert_eq!(split.within, "A##EAL ");
        assert_eq!(split.after, "OF SRI LANKA");
        assert_eq!(split.region.clause_name, "Court Title");
    }

    #[test]
    fn test_split_prefers_latest_starting_region() {
        let line = "0123456789";
        let span = LineSpan {
            number: 0,
            start: 0,
            end: 10,
        };
        let tracker = RegionTracker::new(vec![region("early", 1, 8), region("late", 6, 9)]);
        let split = tracker.split_line(line, span).unwrap();
        assert_eq!(split.region.clause_name, "late");
        assert_eq!(split.within, "678");
    }

    #[test]
    fn test_region_spanning_lines_is_clamped() {
        let text = "abc\ndef";
        let index = LineIndex::build(text);
        let tracker = RegionTracker::new(vec![region("span", 1, 6)]);

        let first = tracker.split_line("abc", index.line(0).unwrap()).unwrap();
        assert_eq!((first.before, first.within, first.after), ("a", "bc", ""));

        let second = tracker.split_line("def", index.line(1).unwrap()).unwrap();
        assert_eq!((second.before, second.within, second.after), ("", "de", "f"));
    }

    #[test]
    fn test_empty_regions_are_dropped() {
        let tracker = RegionTracker::new(vec![region("empty", 4, 4), region("inverted", 9, 2)]);
        assert!(tracker.is_empty());
    }
}
