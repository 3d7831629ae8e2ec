//! Wire shapes exchanged with the analysis and persistence services

use crate::types::Region;
use serde::{Deserialize, Serialize};

/// Response of the clause analysis call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub clause_analysis: ClauseAnalysis,
    #[serde(default)]
    pub saved_text_path: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClauseAnalysis {
    #[serde(default)]
    pub clauses: Vec<ClauseVerdict>,
    #[serde(default)]
    pub statistics: ClauseStatistics,
    #[serde(default)]
    pub corrupted_regions: Vec<Region>,
}

/// The classifier's verdict for a single clause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseVerdict {
    pub clause_name: String,
    pub status: VerdictStatus,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub llm_suggestion: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    Present,
    Missing,
    #[serde(alias = "Corrupted")]
    Corrupt,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseStatistics {
    #[serde(default)]
    pub total_clauses: u32,
    #[serde(default)]
    pub present: u32,
    #[serde(default)]
    pub missing: u32,
    #[serde(default, alias = "corrupt")]
    pub corrupted: u32,
    #[serde(default)]
    pub completion_percentage: f64,
}

/// Body of the "save edited text" call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of the render-to-document call; the response is a binary artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub text: String,
    pub filename: String,
}
