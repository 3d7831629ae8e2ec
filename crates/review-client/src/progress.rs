//! Staged "analysis steps" animation
//!
//! Purely cosmetic: once a result is in, the steps tick over one by one.
//! The running animation is owned through an [`AnimationHandle`]; cancelling
//! or dropping the handle stops any transitions that have not fired yet.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Processing,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub id: u32,
    pub name: String,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub steps: Vec<ProcessStep>,
    pub percent: u8,
}

impl StepProgress {
    pub fn new(names: &[String]) -> Self {
        let steps = names
            .iter()
            .enumerate()
            .map(|(idx, name)| ProcessStep {
                id: idx as u32 + 1,
                name: name.clone(),
                status: StepStatus::Pending,
            })
            .collect();
        Self { steps, percent: 0 }
    }

    /// Mark steps up to and including `done` complete and the next one processing
    pub fn advance(&mut self, done: usize) {
        for (idx, step) in self.steps.iter_mut().enumerate() {
            step.status = if idx <= done {
                StepStatus::Complete
            } else if idx == done + 1 {
                StepStatus::Processing
            } else {
                StepStatus::Pending
            };
        }
        let total = self.steps.len().max(1);
        self.percent = (((done + 1).min(total) * 100) / total) as u8;
    }

    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Complete)
    }
}

#[derive(Debug, Clone)]
pub struct ProgressAnimation {
    names: Vec<String>,
    delay: Duration,
}

impl ProgressAnimation {
    pub fn new(names: Vec<String>, delay: Duration) -> Self {
        Self { names, delay }
    }

    /// Spawn the animation on the current runtime
    pub fn start(&self) -> AnimationHandle {
        let (tx, rx) = watch::channel(StepProgress::new(&self.names));
        let total = self.names.len();
        let delay = self.delay;

        let task = tokio::spawn(async move {
            for done in 0..total {
                tokio::time::sleep(delay).await;
                tx.send_modify(|progress| progress.advance(done));
            }
            debug!(steps = total, "analysis animation finished");
        });

        AnimationHandle { task, progress: rx }
    }
}

/// Owner of a running animation
#[derive(Debug)]
pub struct AnimationHandle {
    task: JoinHandle<()>,
    progress: watch::Receiver<StepProgress>,
}

impl AnimationHandle {
    /// Stop pending transitions; the last published state stays readable
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            debug!("cancelling analysis animation");
        }
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn subscribe(&self) -> watch::Receiver<StepProgress> {
        self.progress.clone()
    }

    pub fn current(&self) -> StepProgress {
        self.progress.borrow().clone()
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
