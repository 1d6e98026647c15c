use thiserror::Error;

use crate::engine::trial::TrialPhase;

#[derive(Error, Debug)]
pub enum ReactxError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Errors raised by the trial engine. Premature input is not one of them:
/// a false start is a modeled outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("round count {got} outside allowed range {min}..={max}")]
    InvalidRoundCount { got: u32, min: u32, max: u32 },

    #[error("cannot {action} while trial is {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: TrialPhase,
    },

    #[error("session already complete after {rounds} rounds")]
    SessionComplete { rounds: usize },

    #[error("session task failed: {0}")]
    Task(String),
}
