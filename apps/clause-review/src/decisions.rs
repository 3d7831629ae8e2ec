//! Scripted operator decisions
//!
//! A decisions file is a TOML list of `[[decision]]` tables applied in order:
//!
//! ```toml
//! [[decision]]
//! action = "input"
//! finding = "Argument Date"
//! value = "12.05.2023"
//!
//! [[decision]]
//! action = "accept-all"
//! ```

use anyhow::{anyhow, Context, Result};
use clause_engine::{LooseMatcher, PatchOutcome, ReviewSession};
use clause_types::FindingId;
use serde::Deserialize;
use std::path::Path;

/// A finding by id or by clause name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FindingRef {
    Id(FindingId),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Accept {
        finding: FindingRef,
        #[serde(default)]
        text: Option<String>,
    },
    Edit {
        finding: FindingRef,
        text: String,
    },
    Reject {
        finding: FindingRef,
    },
    Reset {
        finding: FindingRef,
    },
    /// Operator input for a finding that cannot be predicted
    Input {
        finding: FindingRef,
        value: String,
    },
    AcceptAll,
    RejectAll,
}

#[derive(Debug, Default, Deserialize)]
pub struct DecisionFile {
    #[serde(default, rename = "decision")]
    pub decisions: Vec<Step>,
}

impl DecisionFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read decisions file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse decisions file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn resolve(session: &ReviewSession, finding: &FindingRef) -> Result<FindingId> {
    match finding {
        FindingRef::Id(id) => Ok(*id),
        FindingRef::Name(name) => session
            .store()
            .find_by_name(name, &LooseMatcher)
            .map(|f| f.id)
            .ok_or_else(|| anyhow!("no finding matches '{}'", name)),
    }
}

/// Apply one decision; returns a short description of what happened
pub fn apply_step(session: &mut ReviewSession, step: &Step) -> Result<String> {
    let message = match step {
        Step::Accept { finding, text } => {
            let id = resolve(session, finding)?;
            match session.accept(id, text.as_deref())? {
                PatchOutcome::Applied { .. } => format!("accepted #{}", id),
                PatchOutcome::AlreadyApplied => format!("accepted #{} (already in document)", id),
                PatchOutcome::MarkerNotFound => {
                    format!("accepted #{} (marker not found, document unchanged)", id)
                }
            }
        }
        Step::Edit { finding, text } => {
            let id = resolve(session, finding)?;
            session.edit(id, text)?;
            format!("edited #{}", id)
        }
        Step::Reject { finding } => {
            let id = resolve(session, finding)?;
            session.reject(id)?;
            format!("rejected #{}", id)
        }
        Step::Reset { finding } => {
            let id = resolve(session, finding)?;
            session.reset(id)?;
            format!("reset #{}", id)
        }
        Step::Input { finding, value } => {
            let id = resolve(session, finding)?;
            session.set_user_input(id, value)?;
            format!("input recorded for #{}", id)
        }
        Step::AcceptAll => format!("accepted {} pending", session.accept_all().len()),
        Step::RejectAll => format!("rejected {} pending", session.reject_all().len()),
    };
    Ok(message)
}
