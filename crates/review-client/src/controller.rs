//! Review controller
//!
//! Owns the current [`ReviewSession`] and the services around it. Requests
//! take `&mut self`, so nothing else can touch the session while one is in
//! flight. A failed request never discards the last good session.

use crate::backend::{ClientError, ProgressFn, ReviewBackend, Upload};
use crate::config::ClientConfig;
use crate::progress::{AnimationHandle, ProgressAnimation, StepProgress};
use clause_engine::{artifact_name, ReviewSession};
use clause_types::{AnalysisResult, RenderRequest, SaveResponse};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// The display document as analysed
    Original,
    /// The working copy with resolutions applied
    Completed,
    ComparisonReport,
}

impl Artifact {
    pub fn suffix(&self) -> &'static str {
        match self {
            Artifact::Original => "original",
            Artifact::Completed => "completed",
            Artifact::ComparisonReport => "comparison_report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    PlainText,
}

#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

pub struct ReviewController<B> {
    backend: B,
    config: ClientConfig,
    session: Option<ReviewSession>,
    analysis: Option<AnalysisResult>,
    animation: Option<AnimationHandle>,
}

impl<B: ReviewBackend> ReviewController<B> {
    pub fn new(backend: B, config: ClientConfig) -> Self {
        Self {
            backend,
            config,
            session: None,
            analysis: None,
            animation: None,
        }
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        self.session.as_ref()
    }

    /// The response the current session was built from
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Operator actions (accept, edit, ...) go through the session
    pub fn session_mut(&mut self) -> Option<&mut ReviewSession> {
        self.session.as_mut()
    }

    /// Step animation of the last successful analysis
    pub fn progress(&self) -> Option<watch::Receiver<StepProgress>> {
        self.animation.as_ref().map(|a| a.subscribe())
    }

    pub fn cancel_animation(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.cancel();
        }
    }

    /// Analyse a document and start a new session from it.
    ///
    /// Any running step animation is cancelled first. On failure the error is
    /// returned and the previous session, if any, stays current.
    #[instrument(skip_all, fields(file = %upload.filename))]
    pub async fn run_analysis(
        &mut self,
        upload: Upload,
        progress: ProgressFn,
    ) -> Result<&ReviewSession, ClientError> {
        self.cancel_animation();
        let filename = upload.filename.clone();

        let result = match self.backend.analyze(upload, progress).await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "analysis request failed");
                return Err(err);
            }
        };

        let mut session = match ReviewSession::from_analysis(&result) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "analysis result rejected");
                return Err(ClientError::AnalysisRejected(err.to_string()));
            }
        };
        if session.filename().is_none() {
            session.set_filename(filename);
        }

        let animation = ProgressAnimation::new(self.config.steps.clone(), self.config.step_delay());
        self.animation = Some(animation.start());

        info!(
            session = %session.id(),
            findings = session.store().len(),
            "analysis complete"
        );
        self.analysis = Some(result);
        Ok(&*self.session.insert(session))
    }

    /// Persist the working copy under the analysed filename
    #[instrument(skip_all)]
    pub async fn save_edited_text(&mut self) -> Result<SaveResponse, ClientError> {
        let session = self.session.as_ref().ok_or_else(|| {
            warn!("save requested without an analysed document");
            ClientError::NoSession
        })?;
        let request = session.save_request().ok_or_else(|| {
            warn!("save requested without a filename");
            ClientError::MissingFilename
        })?;

        let filename = request.filename.clone();
        let response = self.backend.save_edited_text(request).await.map_err(|err| {
            error!(error = %err, "save request failed");
            err
        })?;

        if !response.success {
            let reason = response
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(file = %filename, reason = %reason, "save rejected");
            return Err(ClientError::SaveRejected(reason));
        }

        info!(file = %filename, "edited text saved");
        Ok(response)
    }

    /// Render an artifact, falling back to plain text when rendering fails
    #[instrument(skip(self))]
    pub async fn download(&mut self, artifact: Artifact) -> Result<Download, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NoSession)?;
        let base = session.filename().unwrap_or("document").to_string();

        let text = match artifact {
            Artifact::Original => session.document().original().to_string(),
            Artifact::Completed => session.document().modified().to_string(),
            Artifact::ComparisonReport => session.comparison_report(chrono::Utc::now()),
        };

        let request = RenderRequest {
            text: text.clone(),
            filename: artifact_name(&base, artifact.suffix(), "pdf"),
        };

        match self.backend.render_document(request.clone()).await {
            Ok(bytes) => Ok(Download {
                filename: request.filename,
                content_type: ContentType::Pdf,
                bytes,
            }),
            Err(err) => {
                warn!(error = %err, "render failed, falling back to plain text");
                Ok(Download {
                    filename: artifact_name(&base, artifact.suffix(), "txt"),
                    content_type: ContentType::PlainText,
                    bytes: text.into_bytes(),
                })
            }
        }
    }
}
