//! Trial Scheduler: one stimulus-response cycle.
//!
//! `Idle → Armed → StimulusShown → Concluded`, with a direct
//! `Armed → Concluded` edge for false starts. The trial never reads the
//! clock itself; every transition takes `now` from the caller so the same
//! machine runs under a real runtime and in tests.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    Idle,
    Armed,
    StimulusShown,
    Concluded,
}

/// Outcome of one round. `correct` is `None` for tasks without a
/// correctness notion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub elapsed_time_ms: u64,
    pub correct: Option<bool>,
}

impl TrialResult {
    pub fn new(elapsed_time_ms: u64, correct: Option<bool>) -> Self {
        Self {
            elapsed_time_ms,
            correct,
        }
    }
}

/// What happens to qualifying input that arrives before the stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FalseStart {
    /// Input while armed is discarded and the trial keeps waiting.
    Ignore,
    /// The trial concludes at once with a fixed result.
    Penalize {
        penalty_ms: u64,
        correct: Option<bool>,
    },
}

impl FalseStart {
    pub fn penalty_result(&self) -> Option<TrialResult> {
        match *self {
            FalseStart::Ignore => None,
            FalseStart::Penalize {
                penalty_ms,
                correct,
            } => Some(TrialResult::new(penalty_ms, correct)),
        }
    }
}

#[derive(Debug)]
pub struct Trial<S> {
    phase: TrialPhase,
    stimulus: Option<S>,
    delay: Duration,
    armed_at: Option<Instant>,
    onset: Option<Instant>,
}

impl<S> Default for Trial<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Trial<S> {
    pub fn new() -> Self {
        Self {
            phase: TrialPhase::Idle,
            stimulus: None,
            delay: Duration::ZERO,
            armed_at: None,
            onset: None,
        }
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn stimulus(&self) -> Option<&S> {
        self.stimulus.as_ref()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn onset(&self) -> Option<Instant> {
        self.onset
    }

    /// True while the trial accepts input.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, TrialPhase::Armed | TrialPhase::StimulusShown)
    }

    /// When the pending stimulus is due, if the trial is armed.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.phase, self.armed_at) {
            (TrialPhase::Armed, Some(at)) => Some(at + self.delay),
            _ => None,
        }
    }

    pub fn arm(&mut self, stimulus: S, delay: Duration, now: Instant) -> Result<(), EngineError> {
        self.expect(TrialPhase::Idle, "arm")?;
        self.stimulus = Some(stimulus);
        self.delay = delay;
        self.armed_at = Some(now);
        self.phase = TrialPhase::Armed;
        Ok(())
    }

    /// Timer fired: record onset and hand back the stimulus to present.
    pub fn fire(&mut self, now: Instant) -> Result<&S, EngineError> {
        self.expect(TrialPhase::Armed, "present stimulus")?;
        self.onset = Some(now);
        self.phase = TrialPhase::StimulusShown;
        self.stimulus.as_ref().ok_or(EngineError::InvalidTransition {
            action: "present stimulus",
            phase: TrialPhase::Idle,
        })
    }

    /// Qualifying input while armed. Returns the penalty result when the
    /// policy penalizes, `None` when the input is to be ignored.
    pub fn false_start(&mut self, policy: FalseStart) -> Option<TrialResult> {
        if self.phase != TrialPhase::Armed {
            return None;
        }
        let result = policy.penalty_result()?;
        self.phase = TrialPhase::Concluded;
        Some(result)
    }

    /// Concluding input while the stimulus is shown.
    pub fn respond(&mut self, correct: Option<bool>, now: Instant) -> Result<TrialResult, EngineError> {
        self.expect(TrialPhase::StimulusShown, "respond")?;
        let onset = self.onset.unwrap_or(now);
        let elapsed = now.saturating_duration_since(onset).as_millis();
        self.phase = TrialPhase::Concluded;
        Ok(TrialResult::new(
            u64::try_from(elapsed).unwrap_or(u64::MAX),
            correct,
        ))
    }

    fn expect(&self, phase: TrialPhase, action: &'static str) -> Result<(), EngineError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }
}
