//! Persistence for users and scores.
//!
//! The server talks to a [`Store`] trait object so the same handlers run on
//! PostgreSQL in production and on [`MemoryStore`] in tests or demos.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::{LeaderboardFilter, ProfileUpdate, ScoreSubmission};
use crate::error::ReactxError;
use crate::models::{GameScore, LeaderboardEntry, NewUser, StoredUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user. `Conflict` when the email or username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, ReactxError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, ReactxError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, ReactxError>;

    /// Apply the present fields. `None` when the user does not exist,
    /// `Conflict` when the new username is taken.
    async fn update_user(&self, id: Uuid, update: &ProfileUpdate) -> Result<Option<User>, ReactxError>;

    async fn create_score(&self, user_id: Uuid, score: &ScoreSubmission) -> Result<GameScore, ReactxError>;

    /// All scores of one user, newest first.
    async fn scores_for_user(&self, user_id: Uuid) -> Result<Vec<GameScore>, ReactxError>;

    /// Each user's best (lowest) score under the filter, ascending, ranked
    /// from 1, at most `limit` entries.
    async fn leaderboard(
        &self,
        filter: LeaderboardFilter,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, ReactxError>;

    /// Backend description for the health endpoint.
    async fn health(&self) -> Result<String, ReactxError>;

    fn name(&self) -> &str;
}
