pub mod analysis;
pub mod types;

pub use analysis::{
    AnalysisResult, ClauseAnalysis, ClauseStatistics, ClauseVerdict, RenderRequest, SaveRequest,
    SaveResponse, VerdictStatus,
};
pub use types::{
    CorruptedClause, Finding, FindingId, FindingKind, FindingStatus, InputType, MissingClause,
    MissingResolution, Prediction, Provenance, Region, Severity,
};
