//! Review session
//!
//! Ties a [`Document`] to its [`FindingStore`] for the lifetime of one review.
//! Every operator action goes through here so that the finding state and the
//! working copy move together.

use crate::diff::{self, Comparison};
use crate::highlight::{Highlighter, Segments};
use crate::matcher::{LooseMatcher, NameMatcher};
use crate::patch::{Document, PatchOutcome};
use crate::regions::RegionTracker;
use crate::report::{self, ClauseChange};
use crate::store::{resolution_text, Decision, FindingStore, ReviewSummary};
use crate::EngineError;
use chrono::{DateTime, Utc};
use clause_types::{AnalysisResult, ClauseAnalysis, ClauseStatistics, FindingId, SaveRequest};
use tracing::{debug, info};
use uuid::Uuid;

pub struct ReviewSession {
    id: Uuid,
    filename: Option<String>,
    saved_text_path: Option<String>,
    statistics: ClauseStatistics,
    document: Document,
    regions: RegionTracker,
    store: FindingStore,
    matcher: Box<dyn NameMatcher>,
}

impl ReviewSession {
    /// Start a review from a successful analysis response
    pub fn from_analysis(result: &AnalysisResult) -> Result<Self, EngineError> {
        Self::with_matcher(result, Box::new(LooseMatcher))
    }

    pub fn with_matcher(
        result: &AnalysisResult,
        matcher: Box<dyn NameMatcher>,
    ) -> Result<Self, EngineError> {
        if !result.success {
            return Err(EngineError::AnalysisFailed(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| "analysis reported failure".to_string()),
            ));
        }

        let mut session = Self::new(&result.full_text, &result.clause_analysis, matcher);
        session.filename = result.filename.clone();
        session.saved_text_path = result.saved_text_path.clone();
        Ok(session)
    }

    pub fn new(full_text: &str, analysis: &ClauseAnalysis, matcher: Box<dyn NameMatcher>) -> Self {
        let store = FindingStore::bootstrap(full_text, analysis, matcher.as_ref());
        let session = Self {
            id: Uuid::new_v4(),
            filename: None,
            saved_text_path: None,
            statistics: analysis.statistics.clone(),
            document: Document::new(full_text),
            regions: RegionTracker::new(analysis.corrupted_regions.clone()),
            store,
            matcher,
        };
        info!(
            session = %session.id,
            findings = session.store.len(),
            regions = session.regions.regions().len(),
            "review session started"
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = Some(filename.into());
    }

    /// Where the service stored the extracted text, if it did
    pub fn saved_text_path(&self) -> Option<&str> {
        self.saved_text_path.as_deref()
    }

    /// Counts reported by the classifier
    pub fn statistics(&self) -> &ClauseStatistics {
        &self.statistics
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &FindingStore {
        &self.store
    }

    pub fn regions(&self) -> &RegionTracker {
        &self.regions
    }

    /// Accept a finding with `text`, or with its operator input or prediction
    pub fn accept(&mut self, id: FindingId, text: Option<&str>) -> Result<PatchOutcome, EngineError> {
        let finding = self.store.get(id).ok_or(EngineError::UnknownFinding(id))?;
        let resolved = text.unwrap_or_else(|| resolution_text(finding)).to_string();
        if resolved.trim().is_empty() {
            return Err(EngineError::MissingInput {
                id,
                name: finding.name().to_string(),
            });
        }

        let finding = self.store.apply(id, &Decision::Accept(Some(resolved.clone())))?;
        let outcome = self
            .document
            .apply_resolution(finding, &resolved, self.matcher.as_ref());
        debug!(finding = id, applied = outcome.is_applied(), "accepted");
        Ok(outcome)
    }

    /// Replace whatever was written for a finding with `text`
    pub fn edit(&mut self, id: FindingId, text: &str) -> Result<PatchOutcome, EngineError> {
        let finding = self.store.get(id).ok_or(EngineError::UnknownFinding(id))?;
        if text.trim().is_empty() {
            return Err(EngineError::MissingInput {
                id,
                name: finding.name().to_string(),
            });
        }

        while self.document.revert(id) {}
        let finding = self.store.apply(id, &Decision::Edit(text.to_string()))?;
        let outcome = self
            .document
            .apply_resolution(finding, text, self.matcher.as_ref());
        debug!(finding = id, applied = outcome.is_applied(), "edited");
        Ok(outcome)
    }

    /// Status only; the working copy is never touched
    pub fn reject(&mut self, id: FindingId) -> Result<(), EngineError> {
        self.store.apply(id, &Decision::Reject)?;
        debug!(finding = id, "rejected");
        Ok(())
    }

    /// Back to pending with the text the finding had before its last decision.
    /// Returns whether a patch was taken back out of the working copy.
    pub fn reset(&mut self, id: FindingId) -> Result<bool, EngineError> {
        self.store.apply(id, &Decision::Reset)?;
        let mut reverted = false;
        while self.document.revert(id) {
            reverted = true;
        }
        debug!(finding = id, reverted, "reset");
        Ok(reverted)
    }

    /// Accept every pending finding that can be resolved without input
    pub fn accept_all(&mut self) -> Vec<FindingId> {
        let accepted = self.store.accept_all();
        for id in &accepted {
            if let Some(finding) = self.store.get(*id) {
                let text = finding.predicted_text.clone();
                self.document
                    .apply_resolution(finding, &text, self.matcher.as_ref());
            }
        }
        info!(accepted = accepted.len(), "accepted all pending findings");
        accepted
    }

    pub fn reject_all(&mut self) -> Vec<FindingId> {
        let rejected = self.store.reject_all();
        info!(rejected = rejected.len(), "rejected all pending findings");
        rejected
    }

    pub fn set_user_input(&mut self, id: FindingId, value: &str) -> Result<(), EngineError> {
        self.store.set_user_input(id, value)
    }

    /// Operator edit of the whole working copy
    pub fn rewrite_document(&mut self, text: impl Into<String>) {
        self.document.rewrite(text);
        debug!(session = %self.id, "working copy rewritten");
    }

    /// Annotated view of the display document
    pub fn segments(&self) -> Segments<'_> {
        Highlighter::new(
            self.document.original(),
            &self.regions,
            &self.store,
            self.matcher.as_ref(),
        )
        .segments()
    }

    pub fn compare(&self) -> Comparison {
        diff::diff(self.document.original(), self.document.modified())
    }

    pub fn changes(&self) -> Vec<ClauseChange> {
        report::changes(&self.store)
    }

    pub fn summary(&self) -> ReviewSummary {
        self.store.summary()
    }

    pub fn comparison_report(&self, generated_at: DateTime<Utc>) -> String {
        report::comparison_report(
            self.filename.as_deref().unwrap_or("document"),
            &self.changes(),
            self.document.modified(),
            generated_at,
        )
    }

    /// Body for persisting the working copy; `None` without a filename
    pub fn save_request(&self) -> Option<SaveRequest> {
        self.filename.as_ref().map(|filename| SaveRequest {
            filename: filename.clone(),
            content: self.document.modified().to_string(),
        })
    }
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("findings", &self.store.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::SegmentKind;
    use crate::diff::LineFlag;
    use clause_types::{ClauseVerdict, FindingStatus, VerdictStatus};
    use pretty_assertions::assert_eq;

    const JUDGMENT: &str = "IN THE SUPREME COURT OF SRI LANKA\n\
S.C. Case No: [CORRUPTED: SC/###/LA 184/2023]\n\
Argued on: [MISSING: Argument Date - Enter date]\n\
[MISSING: Judge's Opening Statement]\n\
JUDGMENT";

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            success: true,
            full_text: JUDGMENT.to_string(),
            filename: Some("judgment.pdf".to_string()),
            clause_analysis: ClauseAnalysis {
                clauses: vec![
                    ClauseVerdict {
                        clause_name: "Judge's Opening Statement".into(),
                        status: VerdictStatus::Missing,
                        content: None,
                        confidence: Some(0.89),
                        llm_suggestion: Some("This Court has considered the submissions.".into()),
                        description: None,
                    },
                    ClauseVerdict {
                        clause_name: "Case Number".into(),
                        status: VerdictStatus::Corrupt,
                        content: Some("SC/###/LA 184/2023".into()),
                        confidence: None,
                        llm_suggestion: Some("SC/HCCA/LA 184/2023".into()),
                        description: None,
                    },
                ],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_failed_analysis_is_rejected() {
        let result = AnalysisResult {
            success: false,
            error: Some("Only PDF files are supported".into()),
            ..Default::default()
        };
        assert_eq!(
            ReviewSession::from_analysis(&result).unwrap_err(),
            EngineError::AnalysisFailed("Only PDF files are supported".into())
        );
    }

    #[test]
    fn test_full_review_flow() {
        let mut session = ReviewSession::from_analysis(&analysis()).unwrap();
        assert_eq!(session.store().len(), 3);

        // Argument Date needs input first
        assert!(matches!(
            session.accept(3, None),
            Err(EngineError::MissingInput { id: 3, .. })
        ));
        assert_eq!(session.document().modified(), JUDGMENT);

        session.set_user_input(3, "12.05.2023").unwrap();
        assert!(session.accept(3, None).unwrap().is_applied());
        assert!(session.accept(2, None).unwrap().is_applied());
        assert!(session.accept(1, None).unwrap().is_applied());

        assert_eq!(
            session.document().modified(),
            "IN THE SUPREME COURT OF SRI LANKA\n\
S.C. Case No: SC/HCCA/LA 184/2023\n\
Argued on: 12.05.2023\n\
JUDGE'S OPENING STATEMENT\n    This Court has considered the submissions.\n\
JUDGMENT"
        );
        assert_eq!(session.document().original(), JUDGMENT);
        assert_eq!(session.summary().accepted, 3);

        let comparison = session.compare();
        assert_eq!(comparison.defect_lines().count(), 3);
        assert_eq!(comparison.new_lines().count(), 4);
    }

    #[test]
    fn test_edit_after_accept_reaches_document() {
        let mut session = ReviewSession::from_analysis(&analysis()).unwrap();
        session.accept(2, None).unwrap();
        session.edit(2, "SC/CHC/184/2023").unwrap();
        assert!(session
            .document()
            .modified()
            .contains("S.C. Case No: SC/CHC/184/2023\n"));
        assert_eq!(session.store().get(2).unwrap().status, FindingStatus::Edited);
    }

    #[test]
    fn test_reset_restores_marker_and_prediction() {
        let mut session = ReviewSession::from_analysis(&analysis()).unwrap();
        session.accept(1, Some("Custom opening.")).unwrap();
        assert!(session.reset(1).unwrap());

        assert_eq!(session.document().modified(), JUDGMENT);
        let finding = session.store().get(1).unwrap();
        assert_eq!(finding.status, FindingStatus::Pending);
        assert_eq!(finding.predicted_text, "This Court has considered the submissions.");
    }

    #[test]
    fn test_reject_leaves_document() {
        let mut session = ReviewSession::from_analysis(&analysis()).unwrap();
        session.reject(1).unwrap();
        assert_eq!(session.document().modified(), JUDGMENT);
        assert!(session.changes().is_empty());
    }

    #[test]
    fn test_bulk_accept_skips_manual_without_input() {
        let mut session = ReviewSession::from_analysis(&analysis()).unwrap();
        let accepted = session.accept_all();
        assert_eq!(accepted, vec![1, 2]);
        assert!(session
            .document()
            .modified()
            .contains("Argued on: [MISSING: Argument Date - Enter date]"));
        assert_eq!(session.reject_all(), vec![3]);
        assert_eq!(session.summary().pending, 0);
    }

    #[test]
    fn test_segments_track_decisions() {
        let mut session = ReviewSession::from_analysis(&analysis()).unwrap();
        session.accept(2, None).unwrap();

        let corrupted = session
            .segments()
            .find(|s| matches!(s.kind, SegmentKind::CorruptedMarker { .. }))
            .unwrap();
        assert_eq!(
            corrupted.kind,
            SegmentKind::CorruptedMarker {
                finding: Some(2),
                status: FindingStatus::Accepted
            }
        );
    }

    #[test]
    fn test_rewrite_then_compare() {
        let mut session = ReviewSession::from_analysis(&analysis()).unwrap();
        session.rewrite_document("IN THE SUPREME COURT OF SRI LANKA\nRewritten");
        let comparison = session.compare();
        assert_eq!(comparison.right[0].flag, LineFlag::Unchanged);
        assert_eq!(comparison.right[1].flag, LineFlag::New);
        assert_eq!(
            session.save_request().unwrap().content,
            "IN THE SUPREME COURT OF SRI LANKA\nRewritten"
        );
    }
}
