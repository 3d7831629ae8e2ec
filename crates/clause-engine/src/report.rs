//! Change list and the plain-text comparison report

use crate::store::FindingStore;
use chrono::{DateTime, Utc};
use clause_types::{FindingId, FindingKind, FindingStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A missing clause was filled in
    Added,
    /// Corrupted text was replaced
    Corrected,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added => "ADDED",
            ChangeKind::Corrected => "CORRECTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseChange {
    pub id: FindingId,
    pub name: String,
    pub kind: ChangeKind,
    pub section: String,
    pub original_text: Option<String>,
    pub new_text: String,
}

/// Accepted and edited findings, in store order
pub fn changes(store: &FindingStore) -> Vec<ClauseChange> {
    store
        .iter()
        .filter(|f| matches!(f.status, FindingStatus::Accepted | FindingStatus::Edited))
        .map(|f| {
            let (kind, original_text) = match &f.kind {
                FindingKind::Missing(_) => (ChangeKind::Added, None),
                FindingKind::Corrupted(c) => (
                    ChangeKind::Corrected,
                    (!c.corrupted_text.is_empty()).then(|| c.corrupted_text.clone()),
                ),
            };
            ClauseChange {
                id: f.id,
                name: f.name().to_string(),
                kind,
                section: f.location().to_string(),
                original_text,
                new_text: f.predicted_text.clone(),
            }
        })
        .collect()
}

pub fn comparison_report(
    filename: &str,
    changes: &[ClauseChange],
    modified: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let added = changes.iter().filter(|c| c.kind == ChangeKind::Added).count();
    let corrected = changes.len() - added;

    let mut lines = vec![
        "DOCUMENT COMPARISON REPORT".to_string(),
        "==========================".to_string(),
        format!("Original File: {}", filename),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        String::new(),
        "SUMMARY OF CHANGES".to_string(),
        "------------------".to_string(),
        format!("• Added Clauses: {}", added),
        format!("• Corrected Clauses: {}", corrected),
        format!("• Total Changes: {}", changes.len()),
        String::new(),
        "DETAILED CHANGES".to_string(),
        "----------------".to_string(),
        String::new(),
    ];

    for (idx, change) in changes.iter().enumerate() {
        lines.push(format!("{}. {} ({})", idx + 1, change.name, change.kind.label()));
        lines.push(format!("   Section: {}", change.section));
        if let Some(original) = &change.original_text {
            lines.push(format!("   Original: {}", original));
        }
        lines.push(format!("   New Text: {}", change.new_text));
        lines.push(String::new());
    }

    lines.push(String::new());
    lines.push("COMPLETED DOCUMENT".to_string());
    lines.push("==================".to_string());
    lines.push(String::new());
    lines.push(modified.to_string());
    lines.join("\n")
}

/// `judgment.pdf` + `completed` + `pdf` -> `judgment_completed.pdf`
pub fn artifact_name(filename: &str, suffix: &str, ext: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };
    format!("{}_{}.{}", stem, suffix, ext)
}
