//! Scheduled-step progress
//!
//! A [`ProgressSequence`] is an ordered list of steps, each with a target
//! percentage. [`ProgressMachine`] advances through them one tick at a time
//! and is fully deterministic; [`ProgressRunner`] drives a machine from a
//! single tokio task with one timer and a cancellation token.
//!
//! # Example
//! ```rust,ignore
//! let handle = ProgressRunner::spawn(ProgressSequence::style_analysis())?;
//! let mut updates = handle.updates();
//! while let Some(snapshot) = updates.next().await {
//!     println!("{}% {}", snapshot.progress, snapshot.label.unwrap_or_default());
//!     if snapshot.phase.is_terminal() {
//!         break;
//!     }
//! }
//! ```

use crate::core::error::{CatalogError, CatalogResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Sequence definition
// =============================================================================

/// One named step and the percentage it ends at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub id: String,
    pub label: String,
    pub target: f64,
}

impl ProgressStep {
    pub fn new(id: &str, label: &str, target: f64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            target,
        }
    }
}

/// How progress moves toward the current step's target on each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Easing {
    /// Add a fixed amount, clamped to the target
    Linear { increment: f64 },
    /// Close a fraction of the remaining distance
    Approach { factor: f64 },
}

/// Ordered steps plus timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSequence {
    pub steps: Vec<ProgressStep>,
    pub easing: Easing,
    /// Delay between ticks
    pub tick_ms: u64,
    /// Pause after a step completes before the next one starts
    #[serde(default)]
    pub settle_ms: u64,
}

impl ProgressSequence {
    /// Photo analysis: upload, processing, body analysis, style matching, complete
    pub fn style_analysis() -> Self {
        Self {
            steps: vec![
                ProgressStep::new("upload", "Uploading photo", 20.0),
                ProgressStep::new("processing", "Processing image", 40.0),
                ProgressStep::new("body-analysis", "Analyzing body shape", 70.0),
                ProgressStep::new("style-matching", "Matching styles", 90.0),
                ProgressStep::new("complete", "Analysis complete", 100.0),
            ],
            easing: Easing::Approach { factor: 0.1 },
            tick_ms: 100,
            settle_ms: 300,
        }
    }

    /// Single-step upload bar: +10 every 200 ms
    pub fn photo_upload() -> Self {
        Self {
            steps: vec![ProgressStep::new("upload", "Uploading", 100.0)],
            easing: Easing::Linear { increment: 10.0 },
            tick_ms: 200,
            settle_ms: 0,
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// At least one step, targets strictly increasing within (0, 100], sane easing
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::InvalidSequence { message });

        if self.steps.is_empty() {
            return invalid("at least one step is required".to_string());
        }
        let mut previous = 0.0;
        for step in &self.steps {
            if !(step.target > previous && step.target <= 100.0) {
                return invalid(format!(
                    "step '{}' targets {} which must be above {} and at most 100",
                    step.id, step.target, previous
                ));
            }
            previous = step.target;
        }
        match self.easing {
            Easing::Linear { increment } if !(increment > 0.0) => {
                invalid(format!("linear increment must be positive (got {})", increment))
            }
            Easing::Approach { factor } if !(factor > 0.0 && factor <= 1.0) => {
                invalid(format!("approach factor must be in (0, 1] (got {})", factor))
            }
            _ if self.tick_ms == 0 => invalid("tick_ms must be positive".to_string()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// State machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl ProgressPhase {
    /// No further tick can change anything
    pub fn is_terminal(self) -> bool {
        matches!(self, ProgressPhase::Completed | ProgressPhase::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Progress moved within the current step
    Advanced,
    /// The step at this index reached its target; the next one is active
    StepCompleted { step: usize },
    /// The last step reached its target
    Finished,
    /// The machine is not running; nothing changed
    Inert,
}

/// Observable state of a progress run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: ProgressPhase,
    pub step_index: usize,
    pub step_id: Option<String>,
    pub label: Option<String>,
    /// Rounded percentage shown to the user
    pub progress: u8,
}

/// Deterministic tick-driven progress through a sequence
#[derive(Debug, Clone)]
pub struct ProgressMachine {
    sequence: ProgressSequence,
    phase: ProgressPhase,
    step: usize,
    exact: f64,
}

impl ProgressMachine {
    pub fn new(sequence: ProgressSequence) -> Result<Self, ConfigError> {
        sequence.validate()?;
        Ok(Self {
            sequence,
            phase: ProgressPhase::Idle,
            step: 0,
            exact: 0.0,
        })
    }

    pub fn sequence(&self) -> &ProgressSequence {
        &self.sequence
    }

    pub fn phase(&self) -> ProgressPhase {
        self.phase
    }

    /// Begin the run; returns false when it already started
    pub fn start(&mut self) -> bool {
        if self.phase != ProgressPhase::Idle {
            return false;
        }
        self.phase = ProgressPhase::Running;
        self.step = 0;
        self.exact = 0.0;
        true
    }

    /// Advance one tick
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != ProgressPhase::Running {
            return TickOutcome::Inert;
        }
        let target = self.sequence.steps[self.step].target;

        let reached = match self.sequence.easing {
            Easing::Approach { factor } => {
                self.exact += (target - self.exact) * factor;
                self.exact >= target - 1.0
            }
            Easing::Linear { increment } => {
                self.exact = (self.exact + increment).min(target);
                self.exact >= target
            }
        };
        if !reached {
            return TickOutcome::Advanced;
        }

        self.exact = target;
        if self.step + 1 == self.sequence.steps.len() {
            self.phase = ProgressPhase::Completed;
            TickOutcome::Finished
        } else {
            self.step += 1;
            TickOutcome::StepCompleted {
                step: self.step - 1,
            }
        }
    }

    /// Stop the run; returns false when it had already ended
    pub fn cancel(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = ProgressPhase::Cancelled;
        true
    }

    /// Displayed percentage, never above the current step's target
    pub fn progress(&self) -> u8 {
        let ceiling = self
            .sequence
            .steps
            .get(self.step)
            .map(|s| s.target)
            .unwrap_or(100.0);
        self.exact.round().min(ceiling).clamp(0.0, 100.0) as u8
    }

    pub fn step_status(&self, index: usize) -> StepStatus {
        match self.phase {
            ProgressPhase::Completed => StepStatus::Completed,
            _ if index < self.step => StepStatus::Completed,
            ProgressPhase::Running if index == self.step => StepStatus::Active,
            _ => StepStatus::Pending,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let step = self.sequence.steps.get(self.step);
        ProgressSnapshot {
            phase: self.phase,
            step_index: self.step,
            step_id: step.map(|s| s.id.clone()),
            label: step.map(|s| s.label.clone()),
            progress: self.progress(),
        }
    }
}

// =============================================================================
// Tokio driver
// =============================================================================

/// Spawns progress runs on the current tokio runtime
pub struct ProgressRunner;

impl ProgressRunner {
    /// Start driving `sequence` in the background
    pub fn spawn(sequence: ProgressSequence) -> Result<ProgressHandle, ConfigError> {
        let machine = ProgressMachine::new(sequence)?;
        let token = CancellationToken::new();
        let (tx, rx) = watch::channel(machine.snapshot());

        let task = tokio::spawn(drive(machine, token.clone(), tx));
        Ok(ProgressHandle {
            token,
            state: rx,
            task,
        })
    }
}

async fn drive(
    mut machine: ProgressMachine,
    token: CancellationToken,
    tx: watch::Sender<ProgressSnapshot>,
) -> ProgressSnapshot {
    machine.start();
    tracing::debug!(steps = machine.sequence().steps.len(), "progress run started");

    if publish(&tx, &token, machine.snapshot()) {
        let mut delay = machine.sequence().tick();
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {}
            }
            // Check again after every wake-up: a cancel may race the timer
            if token.is_cancelled() {
                break;
            }

            let outcome = machine.tick();
            match outcome {
                TickOutcome::Advanced => delay = machine.sequence().tick(),
                TickOutcome::StepCompleted { step } => {
                    tracing::trace!(step, "progress step completed");
                    delay = machine.sequence().settle();
                }
                TickOutcome::Finished => tracing::debug!("progress run finished"),
                TickOutcome::Inert => {}
            }
            if !publish(&tx, &token, machine.snapshot()) {
                break;
            }
            if matches!(outcome, TickOutcome::Finished | TickOutcome::Inert) {
                return machine.snapshot();
            }
        }
    }

    // Ticks computed after the cancel were never published; keep what was shown
    machine.cancel();
    let mut last = tx.borrow().clone();
    last.phase = ProgressPhase::Cancelled;
    tracing::debug!(progress = last.progress, "progress run cancelled");
    tx.send_replace(last.clone());
    last
}

/// Publish a snapshot unless the run has been cancelled
///
/// The check runs under the channel's write lock, which
/// [`ProgressHandle::cancel`] waits on after cancelling the token.
fn publish(
    tx: &watch::Sender<ProgressSnapshot>,
    token: &CancellationToken,
    snapshot: ProgressSnapshot,
) -> bool {
    tx.send_if_modified(|current| {
        if token.is_cancelled() {
            return false;
        }
        *current = snapshot;
        true
    })
}

/// Handle to a running progress sequence
#[derive(Debug)]
pub struct ProgressHandle {
    token: CancellationToken,
    state: watch::Receiver<ProgressSnapshot>,
    task: JoinHandle<ProgressSnapshot>,
}

impl ProgressHandle {
    /// Stop the run; no progress is applied after this returns
    pub fn cancel(&self) {
        self.token.cancel();
        // Wait out a publish already holding the lock
        drop(self.state.borrow());
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.borrow().clone()
    }

    /// Stream of snapshots, starting with the current one
    pub fn updates(&self) -> WatchStream<ProgressSnapshot> {
        WatchStream::new(self.state.clone())
    }

    /// Wait for the run to finish or be cancelled
    pub async fn wait(self) -> CatalogResult<ProgressSnapshot> {
        self.task
            .await
            .map_err(|e| CatalogError::Internal(format!("progress task failed: {}", e)))
    }
}
