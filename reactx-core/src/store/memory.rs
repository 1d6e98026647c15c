use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::api::{LeaderboardFilter, ProfileUpdate, ScoreSubmission};
use crate::error::ReactxError;
use crate::models::{GameScore, LeaderboardEntry, NewUser, StoredUser, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, StoredUser>,
    /// Insertion order doubles as submission order.
    scores: Vec<GameScore>,
}

/// Process-local store with the same contract as the PostgreSQL one.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, ReactxError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username);
        if taken {
            return Err(ReactxError::Conflict(
                "An account with this email or username already exists.".to_string(),
            ));
        }

        let stored = StoredUser {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            avatar_key: user.avatar_key,
            created_at: Utc::now(),
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored.into_public())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, ReactxError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, ReactxError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned().map(StoredUser::into_public))
    }

    async fn update_user(&self, id: Uuid, update: &ProfileUpdate) -> Result<Option<User>, ReactxError> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &update.username {
            if tables.users.values().any(|u| u.id != id && &u.username == name) {
                return Err(ReactxError::Conflict("Username already taken.".to_string()));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &update.username {
            user.username = name.clone();
        }
        if let Some(avatar) = &update.avatar_key {
            user.avatar_key = avatar.clone();
        }
        Ok(Some(user.clone().into_public()))
    }

    async fn create_score(&self, user_id: Uuid, score: &ScoreSubmission) -> Result<GameScore, ReactxError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(ReactxError::NotFound(format!("user {} not found", user_id)));
        }
        let row = GameScore {
            id: Uuid::new_v4(),
            user_id,
            game_type: score.game_type.as_str().to_string(),
            difficulty: score.difficulty.as_str().to_string(),
            avg_score_time_ms: score.avg_score_time_ms,
            avg_accuracy: score.avg_accuracy,
            created_at: Utc::now(),
        };
        tables.scores.push(row.clone());
        Ok(row)
    }

    async fn scores_for_user(&self, user_id: Uuid) -> Result<Vec<GameScore>, ReactxError> {
        let tables = self.tables.read().await;
        Ok(tables
            .scores
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn leaderboard(
        &self,
        filter: LeaderboardFilter,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, ReactxError> {
        let tables = self.tables.read().await;

        // user -> (position, score) of their best; earlier submission wins ties
        let mut best: HashMap<Uuid, (usize, &GameScore)> = HashMap::new();
        for (pos, score) in tables.scores.iter().enumerate() {
            if let Some(g) = filter.game_type {
                if score.game_type != g.as_str() {
                    continue;
                }
            }
            if let Some(d) = filter.difficulty {
                if score.difficulty != d.as_str() {
                    continue;
                }
            }
            best.entry(score.user_id)
                .and_modify(|cur| {
                    if score.avg_score_time_ms < cur.1.avg_score_time_ms {
                        *cur = (pos, score);
                    }
                })
                .or_insert((pos, score));
        }

        let mut ranked: Vec<(usize, &GameScore)> = best.into_values().collect();
        ranked.sort_by_key(|(pos, s)| (s.avg_score_time_ms, *pos));

        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(ranked
            .into_iter()
            .filter_map(|(_, s)| tables.users.get(&s.user_id).map(|u| (u, s)))
            .take(limit)
            .enumerate()
            .map(|(i, (user, s))| LeaderboardEntry {
                rank: i as i64 + 1,
                username: user.username.clone(),
                avatar_key: user.avatar_key.clone(),
                game_type: s.game_type.clone(),
                difficulty: s.difficulty.clone(),
                avg_score_time_ms: s.avg_score_time_ms,
                avg_accuracy: s.avg_accuracy,
            })
            .collect())
    }

    async fn health(&self) -> Result<String, ReactxError> {
        let tables = self.tables.read().await;
        Ok(format!(
            "in-memory ({} users, {} scores)",
            tables.users.len(),
            tables.scores.len()
        ))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
