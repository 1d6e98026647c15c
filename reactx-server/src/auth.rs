//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying `{ userId, username, exp }`. Passwords are
//! bcrypt hashes; hashing and verification run on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reactx_core::config::AuthConfig;
use reactx_core::models::User;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::AppState;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub username: String,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        if config.jwt_secret == AuthConfig::default().jwt_secret {
            tracing::warn!("auth.jwt_secret is the built-in default; set REACTX__AUTH__JWT_SECRET");
        }
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(ok)
}

/// Extracts and verifies `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            e
        })?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl_hours: i64) -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl_hours: ttl_hours,
            bcrypt_cost: 4,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ann@example.com".to_string(),
            username: "ann".to_string(),
            avatar_key: "avatar1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let tokens = service("secret", 24);
        let u = user();
        let claims = tokens.verify(&tokens.issue(&u).unwrap()).unwrap();
        assert_eq!(claims.user_id, u.id);
        assert_eq!(claims.username, "ann");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_claims_use_user_id_camel_case() {
        let claims = Claims {
            user_id: Uuid::nil(),
            username: "ann".to_string(),
            exp: 0,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_wrong_secret_and_expired_tokens_fail() {
        let u = user();
        let token = service("one", 24).issue(&u).unwrap();
        assert!(service("two", 24).verify(&token).is_err());

        // well past the default 60s leeway
        let expired = service("one", -2).issue(&u).unwrap();
        assert!(service("one", 24).verify(&expired).is_err());
    }

    #[tokio::test]
    async fn test_password_hash_round_trip() {
        let hash = hash_password("secret1".to_string(), 4).await.unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("secret2".to_string(), hash).await.unwrap());
    }
}
