//! The services a review talks to, behind one trait

use async_trait::async_trait;
use clause_types::{AnalysisResult, RenderRequest, SaveRequest, SaveResponse};
use thiserror::Error;

/// Upload progress in percent
pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Analysis rejected: {0}")]
    AnalysisRejected(String),

    #[error("Save rejected: {0}")]
    SaveRejected(String),

    #[error("Render failed with status {0}")]
    RenderFailed(u16),

    #[error("No analysed document in this session")]
    NoSession,

    #[error("No filename to save against")]
    MissingFilename,
}

/// A document picked for analysis
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Extract and classify a document. `progress` receives upload percentages.
    async fn analyze(&self, upload: Upload, progress: ProgressFn)
        -> Result<AnalysisResult, ClientError>;

    async fn save_edited_text(&self, request: SaveRequest) -> Result<SaveResponse, ClientError>;

    /// Render text to a downloadable document
    async fn render_document(&self, request: RenderRequest) -> Result<Vec<u8>, ClientError>;
}
