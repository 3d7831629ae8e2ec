//! Annotation and patch reconciliation for analysed legal documents
//!
//! The inference service hands back a display document with inline
//! `[MISSING: …]` / `[CORRUPTED: …]` markers, per-clause verdicts and
//! corrupted character ranges. This crate turns that into findings an
//! operator can accept, edit or reject, keeps the original and the working
//! copy side by side, and renders both for review.
//!
//! Start from [`ReviewSession::from_analysis`].

pub mod diff;
pub mod error;
pub mod format;
pub mod highlight;
pub mod markers;
pub mod matcher;
pub mod patch;
pub mod regions;
pub mod report;
pub mod session;
pub mod store;

pub use diff::{diff, Comparison, DiffLine, LineFlag};
pub use error::EngineError;
pub use highlight::{Highlighter, Segment, SegmentKind, Segments};
pub use markers::{Marker, MarkerKind};
pub use matcher::{ExactMatcher, LooseMatcher, MatchQuality, NameMatcher};
pub use patch::{AppliedPatch, Document, PatchOutcome};
pub use regions::{LineIndex, LineSpan, RegionTracker};
pub use report::{artifact_name, comparison_report, ChangeKind, ClauseChange};
pub use session::ReviewSession;
pub use store::{transition, Decision, FindingStore, ReviewSummary};
