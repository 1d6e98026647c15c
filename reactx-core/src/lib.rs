pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

pub use client::{ApiClient, ClientError};
pub use config::{ReactxConfig, StoreBackend};
pub use engine::{
    spawn_session, Difficulty, GameType, GameVariant, Session, SessionConfig, SessionEvent,
    SessionHandle, SessionOutcome, SessionSummary, TrialResult,
};
pub use error::{EngineError, ReactxError};
pub use store::{MemoryStore, PgStore, Store};
