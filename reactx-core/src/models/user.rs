use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public profile. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar_key: String,
    pub created_at: DateTime<Utc>,
}

/// Full `users` row, used only for credential checks.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub avatar_key: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn into_public(self) -> User {
        User {
            id: self.id,
            email: self.email,
            username: self.username,
            avatar_key: self.avatar_key,
            created_at: self.created_at,
        }
    }
}

/// A user about to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub avatar_key: String,
}
