use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submitted session result. `game_type` and `difficulty` hold the
/// snake_case wire names and are validated before insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameScore {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_type: String,
    pub difficulty: String,
    pub avg_score_time_ms: i64,
    pub avg_accuracy: Option<f64>,
    pub created_at: DateTime<Utc>,
}
