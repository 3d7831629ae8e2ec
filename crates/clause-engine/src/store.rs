//! Finding store
//!
//! Owns every finding of a review run. Findings are bootstrapped from three
//! sources that only loosely agree with each other: the classifier's per-clause
//! verdicts, the inline markers in the text, and the corrupted regions. Names
//! are reconciled through a [`NameMatcher`].
//!
//! Operator decisions are pure transforms ([`transition`]) so they can be
//! tested without a document.

use crate::markers::{self, Marker, MarkerKind};
use crate::matcher::{best_match, NameMatcher};
use crate::regions::LineIndex;
use crate::EngineError;
use clause_types::{
    ClauseAnalysis, CorruptedClause, Finding, FindingId, FindingKind, FindingStatus, InputType,
    MissingClause, MissingResolution, Prediction, Provenance, Region, Severity, VerdictStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// An operator action on a single finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Accept with explicit text, or with the finding's current resolution
    Accept(Option<String>),
    Edit(String),
    Reject,
    Reset,
}

/// Text that would be substituted if the finding were accepted now:
/// operator input first, then the predicted text
pub fn resolution_text(finding: &Finding) -> &str {
    match finding.user_input_value.as_deref() {
        Some(value) if !value.trim().is_empty() => value,
        _ => &finding.predicted_text,
    }
}

/// Next state of `finding` under `decision`
pub fn transition(finding: &Finding, decision: &Decision) -> Finding {
    let mut next = finding.clone();

    match decision {
        Decision::Accept(text) => {
            let resolved = text
                .clone()
                .unwrap_or_else(|| resolution_text(finding).to_string());
            resolve(&mut next, finding, resolved, FindingStatus::Accepted);
        }
        Decision::Edit(text) => {
            resolve(&mut next, finding, text.clone(), FindingStatus::Edited);
        }
        Decision::Reject => next.status = FindingStatus::Rejected,
        Decision::Reset => {
            if let Some(provenance) = next.provenance.take() {
                next.predicted_text = provenance.predicted_text;
                next.user_input_value = provenance.user_input_value;
            }
            next.status = FindingStatus::Pending;
        }
    }

    next
}

fn resolve(next: &mut Finding, prior: &Finding, text: String, status: FindingStatus) {
    next.provenance = Some(Provenance {
        predicted_text: prior.predicted_text.clone(),
        user_input_value: prior.user_input_value.clone(),
    });
    if prior.needs_manual_input() {
        next.user_input_value = Some(text.clone());
    }
    next.predicted_text = text;
    next.status = status;
}

/// Counts for summary dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total: usize,
    pub missing: usize,
    pub corrupted: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub edited: usize,
    /// Pending findings that cannot be accepted without operator input
    pub awaiting_input: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingStore {
    findings: Vec<Finding>,
}

impl FindingStore {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    /// Build the findings of a run from the display text and the classifier output
    pub fn bootstrap(
        full_text: &str,
        analysis: &ClauseAnalysis,
        matcher: &dyn NameMatcher,
    ) -> Self {
        let mut builder = Bootstrap {
            findings: Vec::new(),
            attached: HashSet::new(),
            matcher,
        };

        for verdict in &analysis.clauses {
            match verdict.status {
                VerdictStatus::Present => {}
                VerdictStatus::Missing => {
                    let predicted_text = verdict
                        .llm_suggestion
                        .clone()
                        .or_else(|| verdict.content.clone())
                        .unwrap_or_default();
                    builder.push(FindingKind::Missing(MissingClause {
                        name: verdict.clause_name.clone(),
                        severity: Severity::Medium,
                        description: verdict.description.clone().unwrap_or_else(|| {
                            format!("{} was not found in the document", verdict.clause_name)
                        }),
                        expected_location: String::new(),
                        resolution: MissingResolution::Predicted(Prediction {
                            predicted_text,
                            confidence: verdict.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
                            rationale: String::new(),
                            alternatives: Vec::new(),
                        }),
                        locator: None,
                    }));
                }
                VerdictStatus::Corrupt => {
                    let id = builder.push(FindingKind::Corrupted(CorruptedClause {
                        name: verdict.clause_name.clone(),
                        issue: verdict
                            .description
                            .clone()
                            .unwrap_or_else(|| "Text corrupted or unreadable".to_string()),
                        section: String::new(),
                        corrupted_text: verdict.content.clone().unwrap_or_default(),
                        locator: None,
                        requires_manual_input: true,
                        input_type: InputType::infer(&verdict.clause_name),
                    }));
                    if let Some(suggestion) = &verdict.llm_suggestion {
                        builder.finding_mut(id).predicted_text = suggestion.clone();
                    }
                }
            }
        }

        let index = LineIndex::build(full_text);
        let lines: Vec<&str> = full_text.split('\n').collect();
        let mut marker_ranges = Vec::new();

        for marker in markers::scan(full_text) {
            let line = lines.get(marker.line).copied().unwrap_or_default();
            match marker.kind {
                MarkerKind::Missing => builder.attach_missing(&marker),
                MarkerKind::Corrupted => builder.attach_corrupted(&marker, line),
            }
            if let Some(span) = index.line(marker.line) {
                let start = span.start + line[..marker.start].chars().count();
                let end = span.start + line[..marker.end].chars().count();
                marker_ranges.push((start, end));
            }
        }

        for region in &analysis.corrupted_regions {
            if region.is_empty() {
                continue;
            }
            if marker_ranges
                .iter()
                .any(|&(start, end)| region.intersects(start, end))
            {
                debug!(clause = %region.clause_name, "region covered by an inline marker");
                continue;
            }
            let line_no = index.line_of(region.start).unwrap_or(0);
            builder.attach_region(region, full_text, line_no);
        }

        debug!(findings = builder.findings.len(), "bootstrapped finding store");
        Self {
            findings: builder.findings,
        }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn get(&self, id: FindingId) -> Option<&Finding> {
        self.findings.iter().find(|f| f.id == id)
    }

    pub fn missing(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_missing())
    }

    pub fn corrupted(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_corrupted())
    }

    /// Ids of findings nobody has decided on yet, in store order
    pub fn pending(&self) -> Vec<FindingId> {
        self.findings
            .iter()
            .filter(|f| f.is_pending())
            .map(|f| f.id)
            .collect()
    }

    pub fn find_by_name(&self, name: &str, matcher: &dyn NameMatcher) -> Option<&Finding> {
        best_match(matcher, name, self.findings.iter(), |f| f.name())
    }

    /// The finding an inline marker stands for
    pub fn finding_for_marker(
        &self,
        marker: &Marker,
        line: &str,
        matcher: &dyn NameMatcher,
    ) -> Option<&Finding> {
        match marker.kind {
            MarkerKind::Missing => self
                .missing()
                .find(|f| match &f.kind {
                    FindingKind::Missing(m) => m.locator.as_deref() == Some(marker.token.as_str()),
                    _ => false,
                })
                .or_else(|| best_match(matcher, marker.label(), self.missing(), |f| f.name())),
            MarkerKind::Corrupted => {
                let by_locator = self.corrupted().find(|f| match &f.kind {
                    FindingKind::Corrupted(c) => c.locator.as_deref() == Some(marker.token.as_str()),
                    _ => false,
                });
                by_locator
                    .or_else(|| {
                        self.corrupted().find(|f| match &f.kind {
                            FindingKind::Corrupted(c) => same_text(&c.corrupted_text, &marker.payload),
                            _ => false,
                        })
                    })
                    .or_else(|| {
                        let label = leading_label(line, marker);
                        best_match(matcher, &label, self.corrupted(), |f| f.name())
                    })
            }
        }
    }

    /// Apply a decision and return the updated finding
    pub fn apply(&mut self, id: FindingId, decision: &Decision) -> Result<&Finding, EngineError> {
        let slot = self.slot(id)?;
        *slot = transition(slot, decision);
        Ok(&*slot)
    }

    /// Record what the operator typed into the manual input form
    pub fn set_user_input(&mut self, id: FindingId, value: &str) -> Result<(), EngineError> {
        self.slot(id)?.user_input_value = Some(value.to_string());
        Ok(())
    }

    /// Accept every pending finding that has a resolution; returns the ids changed
    pub fn accept_all(&mut self) -> Vec<FindingId> {
        self.bulk(|f| {
            (!resolution_text(f).trim().is_empty()).then_some(Decision::Accept(None))
        })
    }

    /// Reject every pending finding; returns the ids changed
    pub fn reject_all(&mut self) -> Vec<FindingId> {
        self.bulk(|_| Some(Decision::Reject))
    }

    fn bulk<F>(&mut self, decide: F) -> Vec<FindingId>
    where
        F: Fn(&Finding) -> Option<Decision>,
    {
        let mut changed = Vec::new();
        for finding in self.findings.iter_mut().filter(|f| f.is_pending()) {
            if let Some(decision) = decide(finding) {
                *finding = transition(finding, &decision);
                changed.push(finding.id);
            }
        }
        changed
    }

    pub fn summary(&self) -> ReviewSummary {
        let mut summary = ReviewSummary {
            total: self.findings.len(),
            ..Default::default()
        };
        for finding in &self.findings {
            if finding.is_missing() {
                summary.missing += 1;
            } else {
                summary.corrupted += 1;
            }
            match finding.status {
                FindingStatus::Pending => {
                    summary.pending += 1;
                    if resolution_text(finding).trim().is_empty() {
                        summary.awaiting_input += 1;
                    }
                }
                FindingStatus::Accepted => summary.accepted += 1,
                FindingStatus::Rejected => summary.rejected += 1,
                FindingStatus::Edited => summary.edited += 1,
            }
        }
        summary
    }

    fn slot(&mut self, id: FindingId) -> Result<&mut Finding, EngineError> {
        self.findings
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(EngineError::UnknownFinding(id))
    }
}

struct Bootstrap<'m> {
    findings: Vec<Finding>,
    /// Findings already bound to a marker or region
    attached: HashSet<FindingId>,
    matcher: &'m dyn NameMatcher,
}

impl Bootstrap<'_> {
    fn push(&mut self, kind: FindingKind) -> FindingId {
        let id = self.findings.len() as FindingId + 1;
        self.findings.push(Finding::new(id, kind));
        id
    }

    fn finding_mut(&mut self, id: FindingId) -> &mut Finding {
        &mut self.findings[id as usize - 1]
    }

    fn attach_missing(&mut self, marker: &Marker) {
        let label = marker.label();
        let candidate = best_match(
            self.matcher,
            label,
            self.findings
                .iter()
                .filter(|f| f.is_missing() && !self.attached.contains(&f.id)),
            |f| f.name(),
        )
        .map(|f| f.id);

        let location = marker
            .hint()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Line {}", marker.line + 1));

        match candidate {
            Some(id) => {
                self.attached.insert(id);
                if let FindingKind::Missing(m) = &mut self.finding_mut(id).kind {
                    if m.expected_location.is_empty() {
                        m.expected_location = location;
                    }
                    m.locator = Some(marker.token.clone());
                }
            }
            None => {
                let input_type = InputType::infer(label);
                let id = self.push(FindingKind::Missing(MissingClause {
                    name: label.to_string(),
                    severity: Severity::High,
                    description: format!("{} is missing and must be entered manually", label),
                    expected_location: location,
                    resolution: MissingResolution::Manual {
                        input_type,
                        placeholder_text: marker
                            .hint()
                            .map(|h| format!("[{}]", h))
                            .unwrap_or_else(|| input_type.placeholder().to_string()),
                    },
                    locator: Some(marker.token.clone()),
                }));
                self.attached.insert(id);
            }
        }
    }

    fn attach_corrupted(&mut self, marker: &Marker, line: &str) {
        let label = leading_label(line, marker);
        let matcher = self.matcher;
        let candidate = self
            .findings
            .iter()
            .filter(|f| !self.attached.contains(&f.id))
            .find(|f| match &f.kind {
                FindingKind::Corrupted(c) => {
                    same_text(&c.corrupted_text, &marker.payload)
                        || (!label.is_empty() && matcher.matches(&c.name, &label))
                }
                _ => false,
            })
            .map(|f| f.id);

        let section = format!("Line {}", marker.line + 1);
        let id = match candidate {
            Some(id) => id,
            None => self.push(FindingKind::Corrupted(CorruptedClause {
                name: if label.is_empty() {
                    format!("Corrupted Text (line {})", marker.line + 1)
                } else {
                    label.clone()
                },
                issue: "Text corrupted or unreadable".to_string(),
                section: String::new(),
                corrupted_text: String::new(),
                locator: None,
                requires_manual_input: true,
                input_type: InputType::infer(&label),
            })),
        };

        self.attached.insert(id);
        if let FindingKind::Corrupted(c) = &mut self.finding_mut(id).kind {
            c.locator = Some(marker.token.clone());
            if c.corrupted_text.is_empty() {
                c.corrupted_text = marker.payload.clone();
            }
            if c.section.is_empty() {
                c.section = section;
            }
        }
    }

    fn attach_region(&mut self, region: &Region, full_text: &str, line_no: usize) {
        let text = region.text.clone().unwrap_or_else(|| {
            full_text
                .chars()
                .skip(region.start)
                .take(region.end - region.start)
                .collect()
        });
        let section = format!("Line {}", line_no + 1);

        let candidate = best_match(
            self.matcher,
            &region.clause_name,
            self.findings.iter().filter(|f| !self.attached.contains(&f.id)),
            |f| f.name(),
        )
        .map(|f| f.id);

        let id = match candidate {
            Some(id) => id,
            None => self.push(FindingKind::Corrupted(CorruptedClause {
                name: region.clause_name.clone(),
                issue: "Corrupted text detected".to_string(),
                section: String::new(),
                corrupted_text: String::new(),
                locator: None,
                requires_manual_input: true,
                input_type: InputType::infer(&region.clause_name),
            })),
        };

        self.attached.insert(id);
        if let FindingKind::Corrupted(c) = &mut self.finding_mut(id).kind {
            if c.corrupted_text.is_empty() {
                c.corrupted_text = text.clone();
            }
            if c.locator.is_none() && !text.trim().is_empty() {
                c.locator = Some(text);
            }
            if c.section.is_empty() {
                c.section = section;
            }
        }
    }
}

/// Text before a marker on its line, used as a clause name ("S.C. Case No")
pub(crate) fn leading_label(line: &str, marker: &Marker) -> String {
    let prefix = crate::format::strip_formatting(&line[..marker.start]);
    prefix
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_string()
}

fn same_text(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}
