//! The reaction-time trial engine: one parameterized scheduler, input
//! classifier and aggregator shared by every game variant.

pub mod aggregate;
pub mod runner;
pub mod session;
pub mod trial;
pub mod variant;
pub mod variants;

pub use aggregate::{SessionAggregator, SessionSummary};
pub use runner::{run_session, spawn_session, SessionEvent, SessionHandle, SessionOutcome};
pub use session::{InputOutcome, RoundReport, Session};
pub use trial::{FalseStart, Trial, TrialPhase, TrialResult};
pub use variant::{
    Difficulty, GameType, GameVariant, RoundLimits, ScoringRule, SessionConfig, StimulusKind,
    TrialParams, Verdict, MAX_ROUNDS, MIN_ROUNDS,
};
