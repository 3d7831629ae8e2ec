//! Plain-text rendering of sessions and comparisons for the terminal

use clause_engine::{Comparison, LineFlag, ReviewSession, ReviewSummary, SegmentKind};
use clause_types::{Finding, FindingId, FindingKind, FindingStatus};

fn status_label(status: FindingStatus) -> &'static str {
    match status {
        FindingStatus::Pending => "pending",
        FindingStatus::Accepted => "accepted",
        FindingStatus::Rejected => "rejected",
        FindingStatus::Edited => "edited",
    }
}

fn marker_tag(finding: Option<FindingId>, status: FindingStatus) -> String {
    match finding {
        Some(id) => format!("#{} {}", id, status_label(status)),
        None => "unmatched".to_string(),
    }
}

/// The display document with markers tagged by finding and regions fenced in `~~`
pub fn annotated(session: &ReviewSession) -> String {
    let mut out = String::new();
    let mut current = 0;

    for segment in session.segments() {
        while current < segment.line {
            out.push('\n');
            current += 1;
        }
        match &segment.kind {
            SegmentKind::Plain => out.push_str(&segment.text),
            SegmentKind::MissingMarker { finding, status }
            | SegmentKind::CorruptedMarker { finding, status } => {
                out.push_str(&format!("{} <{}>", segment.text, marker_tag(*finding, *status)));
            }
            SegmentKind::CorruptedRegion { clause_name } => {
                out.push_str(&format!("~~{}~~ <{}>", segment.text, clause_name));
            }
        }
    }
    out
}

fn finding_row(finding: &Finding) -> String {
    let (kind, detail) = match &finding.kind {
        FindingKind::Missing(clause) => ("missing", clause.expected_location.as_str()),
        FindingKind::Corrupted(clause) => ("corrupted", clause.corrupted_text.as_str()),
    };
    let resolution = finding
        .user_input_value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(&finding.predicted_text);

    format!(
        "{:>3}  {:<9}  {:<8}  {}  [{}] -> {}",
        finding.id,
        kind,
        status_label(finding.status),
        finding.name(),
        detail,
        if resolution.is_empty() {
            "(needs input)"
        } else {
            resolution
        }
    )
}

pub fn findings(session: &ReviewSession) -> String {
    session
        .store()
        .iter()
        .map(finding_row)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summary(summary: &ReviewSummary) -> String {
    format!(
        "{} findings ({} missing, {} corrupted): {} pending, {} accepted, {} edited, {} rejected, {} awaiting input",
        summary.total,
        summary.missing,
        summary.corrupted,
        summary.pending,
        summary.accepted,
        summary.edited,
        summary.rejected,
        summary.awaiting_input
    )
}

fn gutter(flag: LineFlag) -> char {
    match flag {
        LineFlag::Unchanged => ' ',
        LineFlag::Defect(_) => '!',
        LineFlag::New => '+',
    }
}

/// Original and working copy one after the other, each line prefixed with its flag
pub fn dual(comparison: &Comparison) -> String {
    let mut lines = vec!["--- original".to_string()];
    lines.extend(
        comparison
            .left
            .iter()
            .map(|l| format!("{} {:>4} | {}", gutter(l.flag), l.number, l.text)),
    );
    lines.push("+++ modified".to_string());
    lines.extend(
        comparison
            .right
            .iter()
            .map(|l| format!("{} {:>4} | {}", gutter(l.flag), l.number, l.text)),
    );
    lines.join("\n")
}
