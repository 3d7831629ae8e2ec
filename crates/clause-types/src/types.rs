use serde::{Deserialize, Serialize};

pub type FindingId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

/// Kind of value an operator has to type for a finding that cannot be predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Date,
    Currency,
    Signature,
    Number,
}

impl InputType {
    /// Guess the input type from a clause label such as "Argument Date" or "Judge Signature"
    pub fn infer(label: &str) -> Self {
        let lower = label.to_lowercase();

        if lower.contains("date") || lower.contains("argued on") || lower.contains("decided on") {
            InputType::Date
        } else if lower.contains("signature") || lower.contains("signed") {
            InputType::Signature
        } else if lower.contains('$')
            || ["amount", "salary", "fee", "price", "compensation", "rs."]
                .iter()
                .any(|k| lower.contains(k))
        {
            InputType::Currency
        } else if lower.contains("number") || lower.contains("count") {
            InputType::Number
        } else {
            InputType::Text
        }
    }

    /// Placeholder shown in an empty input box
    pub fn placeholder(&self) -> &'static str {
        match self {
            InputType::Date => "YYYY-MM-DD",
            InputType::Currency => "$0.00",
            InputType::Signature => "Type your signature or leave for manual signing",
            InputType::Number => "Enter number",
            InputType::Text => "Enter value",
        }
    }
}

/// Lifecycle of a finding. An absent status is read as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Edited,
}

impl FindingStatus {
    /// True once the operator has made any decision
    pub fn is_decided(&self) -> bool {
        !matches!(self, FindingStatus::Pending)
    }
}

/// Automated suggestion for a missing clause
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_text: String,
    pub confidence: f64, // 0.0 ..= 1.0
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MissingResolution {
    Predicted(Prediction),
    Manual {
        input_type: InputType,
        placeholder_text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingClause {
    pub name: String,
    pub severity: Severity,
    pub description: String,
    pub expected_location: String,
    pub resolution: MissingResolution,
    /// The marker token this clause resolves, when the document carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorruptedClause {
    pub name: String,
    pub issue: String,
    pub section: String,
    /// Corrupted text as reported (marker payload or region text)
    pub corrupted_text: String,
    /// Literal text in the document that a resolution replaces
    #[serde(default)]
    pub locator: Option<String>,
    pub requires_manual_input: bool,
    pub input_type: InputType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingKind {
    Missing(MissingClause),
    Corrupted(CorruptedClause),
}

/// Text a finding carried before its last accept/edit, restored on reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub predicted_text: String,
    pub user_input_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: FindingId,
    pub kind: FindingKind,
    #[serde(default)]
    pub status: FindingStatus,
    /// Text substituted into the document on accept
    #[serde(default)]
    pub predicted_text: String,
    #[serde(default)]
    pub user_input_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl Finding {
    pub fn new(id: FindingId, kind: FindingKind) -> Self {
        let predicted_text = match &kind {
            FindingKind::Missing(MissingClause {
                resolution: MissingResolution::Predicted(p),
                ..
            }) => p.predicted_text.clone(),
            _ => String::new(),
        };

        Self {
            id,
            kind,
            status: FindingStatus::Pending,
            predicted_text,
            user_input_value: None,
            provenance: None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            FindingKind::Missing(m) => &m.name,
            FindingKind::Corrupted(c) => &c.name,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.kind, FindingKind::Missing(_))
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self.kind, FindingKind::Corrupted(_))
    }

    /// Only missing clauses with a prediction branch are predictable
    pub fn is_predictable(&self) -> bool {
        matches!(
            self.kind,
            FindingKind::Missing(MissingClause {
                resolution: MissingResolution::Predicted(_),
                ..
            })
        )
    }

    pub fn needs_manual_input(&self) -> bool {
        match &self.kind {
            FindingKind::Missing(m) => matches!(m.resolution, MissingResolution::Manual { .. }),
            FindingKind::Corrupted(c) => c.requires_manual_input,
        }
    }

    pub fn input_type(&self) -> Option<InputType> {
        match &self.kind {
            FindingKind::Missing(MissingClause {
                resolution: MissingResolution::Manual { input_type, .. },
                ..
            }) => Some(*input_type),
            FindingKind::Missing(_) => None,
            FindingKind::Corrupted(c) => Some(c.input_type),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == FindingStatus::Pending
    }

    /// Where the finding lives in the document, for list views
    pub fn location(&self) -> &str {
        match &self.kind {
            FindingKind::Missing(m) => &m.expected_location,
            FindingKind::Corrupted(c) => &c.section,
        }
    }
}

/// Externally supplied corrupted range, half-open, in character offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub clause_name: String,
    #[serde(default)]
    pub text: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Interval overlap with `[start, end)`
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}
