use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::api::{LeaderboardFilter, ProfileUpdate, ScoreSubmission};
use crate::error::ReactxError;
use crate::models::{GameScore, LeaderboardEntry, NewUser, StoredUser, User};

const USER_COLUMNS: &str = "id, email, username, avatar_key, created_at";
const SCORE_COLUMNS: &str =
    "id, user_id, game_type, difficulty, avg_score_time_ms, avg_accuracy, created_at";

/// Best score per user under optional game/difficulty filters, then ranked.
const LEADERBOARD_SQL: &str = r#"
SELECT
    ROW_NUMBER() OVER (ORDER BY best.avg_score_time_ms ASC, best.created_at ASC) AS rank,
    best.username,
    best.avatar_key,
    best.game_type,
    best.difficulty,
    best.avg_score_time_ms,
    best.avg_accuracy
FROM (
    SELECT DISTINCT ON (s.user_id)
        u.username, u.avatar_key, s.game_type, s.difficulty,
        s.avg_score_time_ms, s.avg_accuracy, s.created_at
    FROM game_scores s
    JOIN users u ON u.id = s.user_id
    WHERE ($1::text IS NULL OR s.game_type = $1)
      AND ($2::text IS NULL OR s.difficulty = $2)
    ORDER BY s.user_id, s.avg_score_time_ms ASC, s.created_at ASC
) AS best
ORDER BY best.avg_score_time_ms ASC, best.created_at ASC
LIMIT $3
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn conflict_or_db(e: sqlx::Error, message: &str) -> ReactxError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ReactxError::Conflict(message.to_string())
        }
        _ => ReactxError::Database(e),
    }
}

fn missing_user_or_db(e: sqlx::Error, user_id: Uuid) -> ReactxError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ReactxError::NotFound(format!("user {} not found", user_id))
        }
        _ => ReactxError::Database(e),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, ReactxError> {
        let sql = format!(
            "INSERT INTO users (id, email, username, password_hash, avatar_key) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.avatar_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_db(e, "An account with this email or username already exists."))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, ReactxError> {
        let user = sqlx::query_as::<_, StoredUser>(
            "SELECT id, email, username, password_hash, avatar_key, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, ReactxError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: &ProfileUpdate) -> Result<Option<User>, ReactxError> {
        let sql = format!(
            "UPDATE users SET username = COALESCE($2, username), \
             avatar_key = COALESCE($3, avatar_key) WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(update.username.as_deref())
            .bind(update.avatar_key.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_or_db(e, "Username already taken."))
    }

    async fn create_score(&self, user_id: Uuid, score: &ScoreSubmission) -> Result<GameScore, ReactxError> {
        let sql = format!(
            "INSERT INTO game_scores (id, user_id, game_type, difficulty, avg_score_time_ms, avg_accuracy) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            SCORE_COLUMNS
        );
        let row = sqlx::query_as::<_, GameScore>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(score.game_type.as_str())
            .bind(score.difficulty.as_str())
            .bind(score.avg_score_time_ms)
            .bind(score.avg_accuracy)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| missing_user_or_db(e, user_id))?;
        Ok(row)
    }

    async fn scores_for_user(&self, user_id: Uuid) -> Result<Vec<GameScore>, ReactxError> {
        let sql = format!(
            "SELECT {} FROM game_scores WHERE user_id = $1 ORDER BY created_at DESC",
            SCORE_COLUMNS
        );
        let rows = sqlx::query_as::<_, GameScore>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn leaderboard(
        &self,
        filter: LeaderboardFilter,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, ReactxError> {
        let rows = sqlx::query_as::<_, LeaderboardEntry>(LEADERBOARD_SQL)
            .bind(filter.game_type.map(|g| g.as_str()))
            .bind(filter.difficulty.map(|d| d.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn health(&self) -> Result<String, ReactxError> {
        Ok(crate::db::health_check(&self.pool).await?)
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
