//! Patch engine
//!
//! A [`Document`] keeps the display text it was created from next to the
//! working copy that resolutions are written into. Nothing else writes the
//! working copy.
//!
//! Offsets are never carried across edits. Every patch re-scans the current
//! text for the marker token its finding is bound to, so a marker that is
//! already gone simply cannot be found again.

use crate::markers::{self, Marker, MarkerKind};
use crate::matcher::{best_match, NameMatcher};
use clause_types::{Finding, FindingId, FindingKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Indentation added to the body of an inserted clause
pub const BODY_INDENT: &str = "    ";

/// One substitution written into the working copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPatch {
    pub finding_id: FindingId,
    /// Byte offset of `inserted` in the working copy when it was written
    pub offset: usize,
    pub replaced: String,
    pub inserted: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied { offset: usize },
    /// The finding's marker is no longer in the text; the document is unchanged
    MarkerNotFound,
    /// The finding already has a patch in the working copy
    AlreadyApplied,
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    original: String,
    modified: String,
    patches: Vec<AppliedPatch>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let original = text.into();
        Self {
            modified: original.clone(),
            original,
            patches: Vec::new(),
        }
    }

    /// The display text, as analysed
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The working copy with resolutions applied
    pub fn modified(&self) -> &str {
        &self.modified
    }

    pub fn patches(&self) -> &[AppliedPatch] {
        &self.patches
    }

    pub fn is_modified(&self) -> bool {
        self.original != self.modified
    }

    /// Write `resolved` into the working copy for `finding`.
    ///
    /// A finding is patched at most once until its patch is reverted or the
    /// working copy is rewritten.
    pub fn apply_resolution(
        &mut self,
        finding: &Finding,
        resolved: &str,
        matcher: &dyn NameMatcher,
    ) -> PatchOutcome {
        if self.patches.iter().any(|p| p.finding_id == finding.id) {
            debug!(finding = finding.id, "already patched, document unchanged");
            return PatchOutcome::AlreadyApplied;
        }

        let target = match &finding.kind {
            FindingKind::Corrupted(clause) => {
                let payload = clause.corrupted_text.trim();
                let locator = clause
                    .locator
                    .clone()
                    .filter(|l| !l.is_empty())
                    .or_else(|| {
                        markers::scan(&self.modified)
                            .into_iter()
                            .find(|m| {
                                m.kind == MarkerKind::Corrupted
                                    && !payload.is_empty()
                                    && m.payload.eq_ignore_ascii_case(payload)
                            })
                            .map(|m| m.token)
                    });
                locator.and_then(|locator| {
                    self.modified
                        .find(&locator)
                        .map(|at| (at, at + locator.len(), resolved.to_string()))
                })
            }
            FindingKind::Missing(clause) => {
                let site = match clause.locator.as_deref().filter(|l| !l.is_empty()) {
                    Some(token) => locate_token(&self.modified, token),
                    None => locate_missing(&self.modified, finding.name(), matcher),
                };
                site.map(|found| {
                    if finding.is_predictable() {
                        let line = &self.modified[found.line_start..found.line_end];
                        (
                            found.line_start,
                            found.line_end,
                            clause_block(line, finding.name(), resolved),
                        )
                    } else {
                        (found.token_start, found.token_end, resolved.to_string())
                    }
                })
            }
        };

        let Some((start, end, inserted)) = target else {
            debug!(finding = finding.id, name = %finding.name(), "marker not found, document unchanged");
            return PatchOutcome::MarkerNotFound;
        };

        let replaced = self.modified[start..end].to_string();
        self.modified.replace_range(start..end, &inserted);
        debug!(finding = finding.id, offset = start, "applied resolution");

        self.patches.push(AppliedPatch {
            finding_id: finding.id,
            offset: start,
            replaced,
            inserted,
        });
        PatchOutcome::Applied { offset: start }
    }

    /// Undo the most recent patch written for `finding_id`. Returns false when
    /// there is nothing to undo or the inserted text has since been edited away.
    pub fn revert(&mut self, finding_id: FindingId) -> bool {
        let Some(idx) = self.patches.iter().rposition(|p| p.finding_id == finding_id) else {
            return false;
        };
        let patch = self.patches.remove(idx);

        let at = if self.modified.get(patch.offset..patch.offset + patch.inserted.len())
            == Some(patch.inserted.as_str())
        {
            Some(patch.offset)
        } else {
            self.modified
                .match_indices(&patch.inserted)
                .map(|(at, _)| at)
                .min_by_key(|at| at.abs_diff(patch.offset))
        };

        match at {
            Some(at) => {
                self.modified
                    .replace_range(at..at + patch.inserted.len(), &patch.replaced);
                debug!(finding = finding_id, offset = at, "reverted resolution");
                true
            }
            None => {
                warn!(finding = finding_id, "resolved text no longer present, cannot revert");
                false
            }
        }
    }

    /// Replace the working copy wholesale. Recorded patches are dropped since
    /// their offsets no longer describe the text.
    pub fn rewrite(&mut self, text: impl Into<String>) {
        self.modified = text.into();
        self.patches.clear();
    }
}

/// Byte ranges of a `MISSING` marker and the line that holds it
struct MissingSite {
    line_start: usize,
    line_end: usize,
    token_start: usize,
    token_end: usize,
}

/// First occurrence of the exact marker token a finding is bound to
fn locate_token(text: &str, token: &str) -> Option<MissingSite> {
    let at = text.find(token)?;
    let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[at..].find('\n').map_or(text.len(), |i| at + i);
    Some(MissingSite {
        line_start,
        line_end,
        token_start: at,
        token_end: at + token.len(),
    })
}

/// The best-matching `MISSING` marker for `name`, for findings not bound to a token
fn locate_missing(text: &str, name: &str, matcher: &dyn NameMatcher) -> Option<MissingSite> {
    let mut line_starts = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        line_starts.push((offset, offset + line.len()));
        offset += line.len() + 1;
    }

    let candidates: Vec<Marker> = markers::scan(text)
        .into_iter()
        .filter(|m| m.kind == MarkerKind::Missing)
        .collect();

    let marker = best_match(matcher, name, candidates.iter(), |m| m.label())?;
    let (line_start, line_end) = line_starts[marker.line];
    Some(MissingSite {
        line_start,
        line_end,
        token_start: line_start + marker.start,
        token_end: line_start + marker.end,
    })
}

/// Heading plus indented body that takes the place of a missing-clause line
fn clause_block(line: &str, name: &str, body: &str) -> String {
    let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
    let mut block = format!("{}{}", indent, name.to_uppercase());
    for body_line in body.lines() {
        block.push('\n');
        if !body_line.trim().is_empty() {
            block.push_str(&indent);
            block.push_str(BODY_INDENT);
            block.push_str(body_line.trim_end());
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::LooseMatcher;
    use clause_types::{
        CorruptedClause, InputType, MissingClause, MissingResolution, Prediction, Severity,
    };
    use pretty_assertions::assert_eq;

    fn manual(id: FindingId, name: &str) -> Finding {
        Finding::new(
            id,
            FindingKind::Missing(MissingClause {
                name: name.to_string(),
                severity: Severity::High,
                description: String::new(),
                expected_location: String::new(),
                resolution: MissingResolution::Manual {
                    input_type: InputType::infer(name),
                    placeholder_text: String::new(),
                },
                locator: None,
            }),
        )
    }

    fn bound(id: FindingId, name: &str) -> Finding {
        let mut finding = manual(id, name);
        if let FindingKind::Missing(m) = &mut finding.kind {
            m.locator = Some(format!("[MISSING: {}]", name));
        }
        finding
    }

    fn predicted(id: FindingId, name: &str, text: &str) -> Finding {
        Finding::new(
            id,
            FindingKind::Missing(MissingClause {
                name: name.to_string(),
                severity: Severity::Medium,
                description: String::new(),
                expected_location: String::new(),
                resolution: MissingResolution::Predicted(Prediction {
                    predicted_text: text.to_string(),
                    confidence: 0.9,
                    ..Default::default()
                }),
                locator: None,
            }),
        )
    }

    fn corrupted(id: FindingId, locator: &str) -> Finding {
        Finding::new(
            id,
            FindingKind::Corrupted(CorruptedClause {
                name: "Case Number".to_string(),
                issue: String::new(),
                section: String::new(),
                corrupted_text: String::new(),
                locator: Some(locator.to_string()),
                requires_manual_input: true,
                input_type: InputType::Number,
            }),
        )
    }

    #[test]
    fn test_manual_missing_replaces_only_the_token() {
        let mut doc = Document::new("Argued on: [MISSING: Argument Date - Enter date]\n");
        let outcome = doc.apply_resolution(&manual(1, "Argument Date"), "12.05.2023", &LooseMatcher);
        assert!(outcome.is_applied());
        assert_eq!(doc.modified(), "Argued on: 12.05.2023\n");
        assert_eq!(doc.original(), "Argued on: [MISSING: Argument Date - Enter date]\n");
    }

    #[test]
    fn test_corrupted_replaces_first_occurrence_verbatim() {
        let mut doc = Document::new("S.C. Case No: [CORRUPTED: SC/###/LA 184/2023]\n");
        let finding = corrupted(1, "[CORRUPTED: SC/###/LA 184/2023]");
        doc.apply_resolution(&finding, "SC/HCCA/LA 184/2023", &LooseMatcher);
        assert_eq!(doc.modified(), "S.C. Case No: SC/HCCA/LA 184/2023\n");
    }

    #[test]
    fn test_duplicate_corrupted_markers_resolve_first_only() {
        let mut doc = Document::new("a [CORRUPTED: ##]\nb [CORRUPTED: ##]");
        doc.apply_resolution(&corrupted(1, "[CORRUPTED: ##]"), "10", &LooseMatcher);
        assert_eq!(doc.modified(), "a 10\nb [CORRUPTED: ##]");
    }

    #[test]
    fn test_predictable_missing_replaces_whole_line() {
        let text = "7. TERMINATION\n  [MISSING: Force Majeure Clause - Should appear here]\n8. NOTICES";
        let mut doc = Document::new(text);
        let finding = predicted(1, "Force Majeure Clause", "Neither party shall be liable.\nfor events beyond control.");
        doc.apply_resolution(&finding, &finding.predicted_text.clone(), &LooseMatcher);
        assert_eq!(
            doc.modified(),
            "7. TERMINATION\n  FORCE MAJEURE CLAUSE\n      Neither party shall be liable.\n      for events beyond control.\n8. NOTICES"
        );
    }

    #[test]
    fn test_second_apply_is_a_document_no_op() {
        let mut doc = Document::new("Argued on: [MISSING: Argument Date]");
        let finding = manual(1, "Argument Date");
        doc.apply_resolution(&finding, "12.05.2023", &LooseMatcher);
        let once = doc.modified().to_string();
        let outcome = doc.apply_resolution(&finding, "12.05.2023", &LooseMatcher);
        assert_eq!(outcome, PatchOutcome::AlreadyApplied);
        assert_eq!(doc.modified(), once);
        assert_eq!(doc.patches().len(), 1);
    }

    #[test]
    fn test_prefers_best_quality_marker() {
        let text = "[MISSING: Second Judge Signature]\n[MISSING: Judge Signature]";
        let mut doc = Document::new(text);
        doc.apply_resolution(&manual(1, "Judge Signature"), "A. Perera", &LooseMatcher);
        assert_eq!(doc.modified(), "[MISSING: Second Judge Signature]\nA. Perera");
    }

    #[test]
    fn test_revert_follows_shifted_text() {
        let text = "Case: [CORRUPTED: ###]\nArgued on: [MISSING: Argument Date]";
        let mut doc = Document::new(text);
        doc.apply_resolution(&manual(2, "Argument Date"), "12.05.2023", &LooseMatcher);
        doc.apply_resolution(&corrupted(1, "[CORRUPTED: ###]"), "SC/HCCA/LA 184/2023", &LooseMatcher);

        assert!(doc.revert(2));
        assert_eq!(doc.modified(), "Case: SC/HCCA/LA 184/2023\nArgued on: [MISSING: Argument Date]");
        assert!(doc.revert(1));
        assert_eq!(doc.modified(), text);
        assert!(!doc.revert(1));
    }

    #[test]
    fn test_rewrite_drops_patch_log() {
        let mut doc = Document::new("Argued on: [MISSING: Argument Date]");
        doc.apply_resolution(&manual(1, "Argument Date"), "today", &LooseMatcher);
        doc.rewrite("hand edited");
        assert!(doc.patches().is_empty());
        assert!(!doc.revert(1));
        assert_eq!(doc.modified(), "hand edited");
    }

    #[test]
    fn test_corrupted_without_locator_falls_back_to_payload() {
        let mut finding = corrupted(1, "");
        if let FindingKind::Corrupted(c) = &mut finding.kind {
            c.locator = None;
            c.corrupted_text = "## days".to_string();
        }
        let mut doc = Document::new("Notice: [CORRUPTED: ## days]");
        doc.apply_resolution(&finding, "30 days", &LooseMatcher);
        assert_eq!(doc.modified(), "Notice: 30 days");
    }

    #[test]
    fn test_bound_finding_never_takes_a_sibling_marker() {
        let text = "Signed: [MISSING: Second Judge Signature]\nSigned: [MISSING: Judge Signature]\n";
        let mut doc = Document::new(text);
        let finding = bound(2, "Judge Signature");

        assert!(doc.apply_resolution(&finding, "A. Perera", &LooseMatcher).is_applied());
        let once = doc.modified().to_string();
        assert_eq!(once, "Signed: [MISSING: Second Judge Signature]\nSigned: A. Perera\n");

        assert_eq!(
            doc.apply_resolution(&finding, "A. Perera", &LooseMatcher),
            PatchOutcome::AlreadyApplied
        );
        assert_eq!(doc.modified(), once);

        // the patch log is gone after a rewrite, the bound token still is too
        doc.rewrite(once.clone());
        assert_eq!(
            doc.apply_resolution(&finding, "A. Perera", &LooseMatcher),
            PatchOutcome::MarkerNotFound
        );
        assert_eq!(doc.modified(), once);
    }

    #[test]
    fn test_bound_predictable_finding_replaces_its_own_line() {
        let mut finding = predicted(1, "Judge Signature", "Signed in open court.");
        if let FindingKind::Missing(m) = &mut finding.kind {
            m.locator = Some("[MISSING: Judge Signature]".to_string());
        }
        let mut doc = Document::new("[MISSING: Second Judge Signature]\n  [MISSING: Judge Signature]\nEnd");
        doc.apply_resolution(&finding, "Signed in open court.", &LooseMatcher);
        assert_eq!(
            doc.modified(),
            "[MISSING: Second Judge Signature]\n  JUDGE SIGNATURE\n      Signed in open court.\nEnd"
        );
    }

    #[test]
    fn test_empty_locator_is_ignored() {
        let mut finding = corrupted(1, "");
        if let FindingKind::Corrupted(c) = &mut finding.kind {
            c.corrupted_text = "## days".to_string();
        }
        let mut doc = Document::new("Notice: [CORRUPTED: ## days]");
        doc.apply_resolution(&finding, "30 days", &LooseMatcher);
        assert_eq!(doc.modified(), "Notice: 30 days");

        let mut doc = Document::new("Notice period applies.");
        let outcome = doc.apply_resolution(&corrupted(2, ""), "30 days", &LooseMatcher);
        assert_eq!(outcome, PatchOutcome::MarkerNotFound);
        assert_eq!(doc.modified(), "Notice period applies.");
    }
}
