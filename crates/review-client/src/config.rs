//! Client configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//! `CLAUSE_REVIEW_API_BASE` overrides `base_url`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const API_BASE_ENV: &str = "CLAUSE_REVIEW_API_BASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_analyze_path")]
    pub analyze_path: String,
    #[serde(default = "default_save_path")]
    pub save_path: String,
    #[serde(default = "default_render_path")]
    pub render_path: String,
    /// Delay between animated analysis steps
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default = "default_steps")]
    pub steps: Vec<String>,
    /// Transport timeout; none by default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_analyze_path() -> String {
    "/analyze-clauses".to_string()
}

fn default_save_path() -> String {
    "/save-edited-text".to_string()
}

fn default_render_path() -> String {
    "/generate-pdf".to_string()
}

fn default_step_delay_ms() -> u64 {
    1200
}

fn default_steps() -> Vec<String> {
    [
        "Extracting text",
        "Identifying clauses",
        "Validating structure",
        "Checking completeness",
        "Generating report",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            analyze_path: default_analyze_path(),
            save_path: default_save_path(),
            render_path: default_render_path(),
            step_delay_ms: default_step_delay_ms(),
            steps: default_steps(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse TOML and apply the environment override
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse client config")?;
        Ok(config.with_env_override())
    }

    pub fn with_env_override(self) -> Self {
        match std::env::var(API_BASE_ENV) {
            Ok(base) if !base.trim().is_empty() => self.with_base_url(base.trim()),
            _ => self,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
