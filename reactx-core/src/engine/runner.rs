//! Async session runner.
//!
//! A session runs as one tokio task. It owns its [`Session`], a single
//! [`RoundTimer`] and the receiving end of the input channel. The host keeps
//! a [`SessionHandle`] to feed input and to cancel; dropping the handle
//! cancels the session. After cancellation no stimulus is presented and no
//! `Completed` event is emitted.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant, Sleep};
use tokio_util::sync::CancellationToken;

use super::aggregate::SessionSummary;
use super::session::{InputOutcome, Session};
use super::trial::TrialResult;
use super::variant::GameVariant;
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent<S> {
    /// `cue` carries the stimulus for variants that play it during the delay.
    RoundArmed {
        round: u32,
        delay: Duration,
        cue: Option<S>,
    },
    StimulusShown { round: u32, stimulus: S },
    /// A multi-step round accepted a partial answer.
    InputProgress { round: u32 },
    RoundConcluded {
        round: u32,
        result: TrialResult,
        false_start: bool,
    },
    Completed(SessionSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed {
        summary: SessionSummary,
        results: Vec<TrialResult>,
    },
    Cancelled {
        rounds_completed: usize,
    },
}

/// The one pending stimulus timer of a session. Disarming drops the sleep,
/// so a cancelled round can never fire.
struct RoundTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl RoundTimer {
    fn idle() -> Self {
        Self { sleep: None }
    }

    fn arm(&mut self, deadline: Instant) {
        self.sleep = Some(Box::pin(sleep_until(deadline)));
    }

    fn disarm(&mut self) {
        self.sleep = None;
    }

    /// Resolves when the armed deadline passes; never resolves while idle.
    fn fired(&mut self) -> impl Future<Output = ()> + '_ {
        async move {
            match self.sleep.as_mut() {
                Some(sleep) => sleep.as_mut().await,
                None => std::future::pending().await,
            }
        }
    }
}

pub struct SessionHandle<I> {
    inputs: mpsc::UnboundedSender<I>,
    cancel: CancellationToken,
    task: Option<JoinHandle<SessionOutcome>>,
}

impl<I> SessionHandle<I> {
    /// Forward one input event. Returns false once the session has ended.
    pub fn send(&self, input: I) -> bool {
        self.inputs.send(input).is_ok()
    }

    /// A clone of the input channel, for hosts that read input on another task.
    pub fn input_sender(&self) -> mpsc::UnboundedSender<I> {
        self.inputs.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the session task to finish.
    pub async fn join(mut self) -> Result<SessionOutcome, EngineError> {
        match self.task.take() {
            Some(task) => task.await.map_err(|e| EngineError::Task(e.to_string())),
            None => Err(EngineError::Task("session already joined".to_string())),
        }
    }
}

impl<I> Drop for SessionHandle<I> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn the session on the current runtime.
pub fn spawn_session<G, R>(
    session: Session<G, R>,
) -> (
    SessionHandle<G::Input>,
    mpsc::UnboundedReceiver<SessionEvent<G::Stimulus>>,
)
where
    G: GameVariant + 'static,
    R: Rng + Send + 'static,
{
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_session(session, input_rx, event_tx, cancel.clone()));

    (
        SessionHandle {
            inputs: input_tx,
            cancel,
            task: Some(task),
        },
        event_rx,
    )
}

/// Drive a session to completion or cancellation.
pub async fn run_session<G, R>(
    mut session: Session<G, R>,
    mut inputs: mpsc::UnboundedReceiver<G::Input>,
    events: mpsc::UnboundedSender<SessionEvent<G::Stimulus>>,
    cancel: CancellationToken,
) -> SessionOutcome
where
    G: GameVariant,
    R: Rng,
{
    let params = *session.variant().params();
    let game = session.variant().game_type();
    let cues = session.variant().cues_during_delay();
    let mut timer = RoundTimer::idle();

    tracing::info!(
        game = %game,
        rounds = session.config().round_count(),
        difficulty = %session.config().difficulty(),
        "session started"
    );

    if !pause(params.lead_in_ms, &mut inputs, &cancel).await {
        return cancelled(&session);
    }

    loop {
        let now = Instant::now();
        let delay = match session.start_round(now) {
            Ok(delay) => delay,
            Err(e) => {
                tracing::error!(error = %e, "failed to start round");
                return cancelled(&session);
            }
        };
        let round = session.round();
        timer.arm(now + delay);
        let cue = if cues { session.stimulus().cloned() } else { None };
        let _ = events.send(SessionEvent::RoundArmed { round, delay, cue });

        let report = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    timer.disarm();
                    return cancelled(&session);
                }
                _ = timer.fired() => {
                    timer.disarm();
                    match session.on_timer(Instant::now()) {
                        Ok(stimulus) => {
                            let stimulus = stimulus.clone();
                            let _ = events.send(SessionEvent::StimulusShown { round, stimulus });
                        }
                        Err(e) => tracing::warn!(error = %e, round, "timer fired outside an armed trial"),
                    }
                }
                input = inputs.recv() => {
                    let Some(input) = input else {
                        timer.disarm();
                        return cancelled(&session);
                    };
                    match session.on_input(&input, Instant::now()) {
                        Ok(InputOutcome::Concluded(report)) => {
                            timer.disarm();
                            break report;
                        }
                        Ok(InputOutcome::Pending) => {
                            let _ = events.send(SessionEvent::InputProgress { round });
                        }
                        Ok(InputOutcome::Ignored) => {}
                        Err(e) => tracing::warn!(error = %e, round, "input rejected"),
                    }
                }
            }
        };

        let _ = events.send(SessionEvent::RoundConcluded {
            round,
            result: report.result,
            false_start: report.false_start,
        });

        if let Some(summary) = report.summary {
            tracing::info!(
                game = %game,
                average_time_ms = summary.average_time_ms,
                average_accuracy = ?summary.average_accuracy,
                "session completed"
            );
            let _ = events.send(SessionEvent::Completed(summary));
            return SessionOutcome::Completed {
                summary,
                results: session.results().to_vec(),
            };
        }

        if !pause(params.inter_round_ms, &mut inputs, &cancel).await {
            return cancelled(&session);
        }
    }
}

/// Wait `ms` while discarding input. Returns false if cancelled meanwhile.
async fn pause<I>(ms: u64, inputs: &mut mpsc::UnboundedReceiver<I>, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if ms == 0 {
        return true;
    }

    let wait = sleep(Duration::from_millis(ms));
    tokio::pin!(wait);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return false,
            _ = &mut wait => return true,
            input = inputs.recv() => {
                if input.is_none() {
                    return false;
                }
            }
        }
    }
}

fn cancelled<G: GameVariant, R: Rng>(session: &Session<G, R>) -> SessionOutcome {
    let rounds_completed = session.results().len();
    tracing::info!(rounds_completed, "session cancelled");
    SessionOutcome::Cancelled { rounds_completed }
}
