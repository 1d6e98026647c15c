//! One session: a variant, its RNG, the current trial and the aggregator.
//!
//! This is the synchronous core the async runner drives. Every method takes
//! the current instant, so a whole session can be replayed in tests without
//! a clock.

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use super::aggregate::{SessionAggregator, SessionSummary};
use super::trial::{Trial, TrialPhase, TrialResult};
use super::variant::{GameVariant, SessionConfig, Verdict};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: u32,
    pub result: TrialResult,
    pub false_start: bool,
    /// Set on the round that completes the session, and only then.
    pub summary: Option<SessionSummary>,
}

/// Result of `on_input`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputOutcome {
    Ignored,
    Pending,
    Concluded(RoundReport),
}

pub struct Session<G: GameVariant, R: Rng> {
    variant: G,
    rng: R,
    config: SessionConfig,
    trial: Trial<G::Stimulus>,
    aggregator: SessionAggregator,
    round: u32,
}

impl<G: GameVariant, R: Rng> Session<G, R> {
    pub fn new(variant: G, config: SessionConfig, rng: R) -> Self {
        Self {
            variant,
            rng,
            config,
            trial: Trial::new(),
            aggregator: SessionAggregator::new(config.round_count()),
            round: 0,
        }
    }

    pub fn variant(&self) -> &G {
        &self.variant
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of the round in progress (or last played), 0 before the first.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> TrialPhase {
        self.trial.phase()
    }

    pub fn stimulus(&self) -> Option<&G::Stimulus> {
        self.trial.stimulus()
    }

    pub fn results(&self) -> &[TrialResult] {
        self.aggregator.results()
    }

    pub fn is_complete(&self) -> bool {
        self.aggregator.is_complete()
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.aggregator.summary()
    }

    /// Arm the next round. Returns the delay after which the stimulus is due.
    pub fn start_round(&mut self, now: Instant) -> Result<Duration, EngineError> {
        if self.aggregator.is_complete() {
            return Err(EngineError::SessionComplete {
                rounds: self.aggregator.results().len(),
            });
        }
        if self.trial.is_open() {
            return Err(EngineError::InvalidTransition {
                action: "start round",
                phase: self.trial.phase(),
            });
        }

        let stimulus = self.variant.present_stimulus(&mut self.rng);
        let delay = self.variant.onset_delay(&stimulus, &mut self.rng);

        let mut trial = Trial::new();
        trial.arm(stimulus, delay, now)?;
        self.trial = trial;
        self.round += 1;

        tracing::debug!(
            game = %self.variant.game_type(),
            round = self.round,
            delay_ms = delay.as_millis() as u64,
            "round armed"
        );
        Ok(delay)
    }

    /// The round timer fired.
    pub fn on_timer(&mut self, now: Instant) -> Result<&G::Stimulus, EngineError> {
        self.trial.fire(now)
    }

    pub fn on_input(&mut self, input: &G::Input, now: Instant) -> Result<InputOutcome, EngineError> {
        if !self.variant.is_qualifying(input) {
            return Ok(InputOutcome::Ignored);
        }

        match self.trial.phase() {
            TrialPhase::Armed => {
                let policy = self.variant.params().false_start;
                match self.trial.false_start(policy) {
                    Some(result) => self.conclude(result, true),
                    None => Ok(InputOutcome::Ignored),
                }
            }
            TrialPhase::StimulusShown => {
                let verdict = match self.trial.stimulus() {
                    Some(stimulus) => self.variant.classify_input(stimulus, input),
                    None => Verdict::Ignored,
                };
                match verdict {
                    Verdict::Ignored => Ok(InputOutcome::Ignored),
                    Verdict::Pending => Ok(InputOutcome::Pending),
                    Verdict::Conclude { correct } => {
                        let result = self.trial.respond(correct, now)?;
                        self.conclude(result, false)
                    }
                }
            }
            TrialPhase::Idle | TrialPhase::Concluded => Ok(InputOutcome::Ignored),
        }
    }

    fn conclude(&mut self, result: TrialResult, false_start: bool) -> Result<InputOutcome, EngineError> {
        let summary = self.aggregator.record(result)?;

        tracing::debug!(
            round = self.round,
            elapsed_ms = result.elapsed_time_ms,
            correct = ?result.correct,
            false_start,
            "round concluded"
        );

        Ok(InputOutcome::Concluded(RoundReport {
            round: self.round,
            result,
            false_start,
            summary,
        }))
    }
}
