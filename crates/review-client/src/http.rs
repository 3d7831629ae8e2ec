//! reqwest implementation of [`ReviewBackend`]

use crate::backend::{ClientError, ProgressFn, ReviewBackend, Upload};
use crate::config::ClientConfig;
use async_trait::async_trait;
use clause_types::{AnalysisResult, RenderRequest, SaveRequest, SaveResponse};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("clause-review/", env!("CARGO_PKG_VERSION"));

pub struct HttpBackend {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl ReviewBackend for HttpBackend {
    async fn analyze(
        &self,
        upload: Upload,
        progress: ProgressFn,
    ) -> Result<AnalysisResult, ClientError> {
        let url = self.config.url(&self.config.analyze_path);
        debug!(url = %url, file = %upload.filename, bytes = upload.bytes.len(), "uploading for analysis");

        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename.clone())
            .mime_str("application/pdf")
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("original_filename", upload.filename.clone());

        progress(0);
        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        progress(100);

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::AnalysisRejected(error_message(status, &body)));
        }

        let result: AnalysisResult =
            serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))?;
        if !result.success {
            return Err(ClientError::AnalysisRejected(
                result
                    .error
                    .unwrap_or_else(|| "analysis reported failure".to_string()),
            ));
        }

        info!(
            file = %upload.filename,
            clauses = result.clause_analysis.clauses.len(),
            regions = result.clause_analysis.corrupted_regions.len(),
            "analysis received"
        );
        Ok(result)
    }

    async fn save_edited_text(&self, request: SaveRequest) -> Result<SaveResponse, ClientError> {
        let url = self.config.url(&self.config.save_path);
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match serde_json::from_str::<SaveResponse>(&body) {
            Ok(saved) => Ok(saved),
            Err(_) if !status.is_success() => Ok(SaveResponse {
                success: false,
                error: Some(error_message(status, &body)),
            }),
            Err(e) => Err(ClientError::Malformed(e.to_string())),
        }
    }

    async fn render_document(&self, request: RenderRequest) -> Result<Vec<u8>, ClientError> {
        let url = self.config.url(&self.config.render_path);
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RenderFailed(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Best-effort error text from a failed response body
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
