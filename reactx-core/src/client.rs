//! HTTP client for the reactX REST API.
//!
//! Used by the CLI to submit finished sessions and browse the leaderboard.
//! Submissions are attempted once; a failure is reported to the caller and
//! never retried here.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::api::{
    AuthResponse, LeaderboardFilter, LeaderboardQuery, LoginRequest, RegisterRequest,
    ScoreSubmission,
};
use crate::models::{GameScore, LeaderboardEntry, User};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    #[error("not logged in: set REACTX_TOKEN or run `reactx login`")]
    MissingToken,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        // 503 still carries a useful body
        Ok(response.json().await?)
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let request = self.client.post(self.url("/api/auth/register")).json(req);
        self.send(request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let request = self.client.post(self.url("/api/auth/login")).json(&body);
        self.send(request).await
    }

    pub async fn submit_score(&self, score: &ScoreSubmission) -> Result<GameScore, ClientError> {
        let request = self.authed(self.client.post(self.url("/api/scores")))?.json(score);
        self.send(request).await
    }

    pub async fn my_scores(&self) -> Result<Vec<GameScore>, ClientError> {
        let request = self.authed(self.client.get(self.url("/api/scores/me")))?;
        self.send(request).await
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        let request = self.authed(self.client.get(self.url("/api/users/me")))?;
        self.send(request).await
    }

    pub async fn leaderboard(&self, filter: LeaderboardFilter) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let query = LeaderboardQuery::from(filter);
        let request = self.client.get(self.url("/api/leaderboard")).query(&query);
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        match &self.token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(ClientError::MissingToken),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or(body);

    tracing::debug!(code = status.as_u16(), message = %message, "API error response");
    Err(ClientError::Api {
        code: status.as_u16(),
        message,
    })
}
