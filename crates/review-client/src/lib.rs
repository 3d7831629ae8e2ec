//! Client side of a clause review
//!
//! Talks to the analysis, persistence and rendering services through a
//! [`ReviewBackend`], drives the cosmetic step animation and keeps the
//! current [`clause_engine::ReviewSession`] in a [`ReviewController`].

pub mod backend;
pub mod config;
pub mod controller;
pub mod http;
pub mod progress;

pub use backend::{ClientError, ProgressFn, ReviewBackend, Upload};
pub use config::ClientConfig;
pub use controller::{Artifact, ContentType, Download, ReviewController};
pub use http::HttpBackend;
pub use progress::{AnimationHandle, ProcessStep, ProgressAnimation, StepProgress, StepStatus};
