use clause_types::FindingId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("No finding with id {0}")]
    UnknownFinding(FindingId),

    #[error("Finding {id} ({name}) has no resolution text")]
    MissingInput { id: FindingId, name: String },

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}
