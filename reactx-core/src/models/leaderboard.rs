use serde::{Deserialize, Serialize};

/// A user's best score under a leaderboard filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub username: String,
    pub avatar_key: String,
    pub game_type: String,
    pub difficulty: String,
    pub avg_score_time_ms: i64,
    pub avg_accuracy: Option<f64>,
}
