//! reactX HTTP REST API
//!
//! Each endpoint has a thin axum handler that delegates to an inner function
//! returning `(StatusCode, serde_json::Value)`. The inner functions are
//! directly testable without the axum dispatch machinery.
//!
//! Endpoints:
//! - GET   /health              store health
//! - GET   /version             server version info
//! - POST  /api/auth/register   create an account
//! - POST  /api/auth/login      exchange credentials for a token
//! - POST  /api/scores          submit a finished session (bearer)
//! - GET   /api/scores/me       own score history (bearer)
//! - GET   /api/users/me        own profile (bearer)
//! - PATCH /api/users/me        update username / avatar (bearer)
//! - GET   /api/leaderboard     best score per user, ranked

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use reactx_core::api::{LeaderboardQuery, LoginRequest, ProfileUpdate, RegisterRequest, ScoreRequest};
use reactx_core::{ReactxConfig, Store};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::{AuthUser, TokenService};
use crate::error::ApiError;
use crate::subsystems::{accounts, leaderboard, scores};

/// Shared state for all HTTP handlers
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: ReactxConfig,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ReactxConfig) -> Self {
        let tokens = TokenService::new(&config.auth);
        Self {
            store,
            config,
            tokens,
        }
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/scores", post(submit_score_handler))
        .route("/scores/me", get(my_scores_handler))
        .route("/users/me", get(profile_handler).patch(update_profile_handler))
        .route("/leaderboard", get(leaderboard_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .nest("/api", api)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<AppState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("reactX HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

fn respond<T: Serialize>(ok: StatusCode, result: Result<T, ApiError>) -> (StatusCode, serde_json::Value) {
    match result.and_then(|v| {
        serde_json::to_value(v).map_err(|e| ApiError::Internal(e.to_string()))
    }) {
        Ok(body) => (ok, body),
        Err(e) => e.into_parts(),
    }
}

/// Inner health check: asks the store and returns (status_code, json_body).
pub async fn health_inner(store: &dyn Store) -> (StatusCode, serde_json::Value) {
    match store.health().await {
        Ok(detail) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "store": store.name(),
                "detail": detail,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "store": store.name(),
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "api": "reactx/1",
    })
}

pub async fn register_inner(state: &AppState, req: RegisterRequest) -> (StatusCode, serde_json::Value) {
    let result = accounts::register(
        state.store.as_ref(),
        &state.tokens,
        state.config.auth.bcrypt_cost,
        req,
    )
    .await;
    respond(StatusCode::CREATED, result)
}

pub async fn login_inner(state: &AppState, req: LoginRequest) -> (StatusCode, serde_json::Value) {
    let result = accounts::login(state.store.as_ref(), &state.tokens, req).await;
    respond(StatusCode::OK, result)
}

pub async fn submit_score_inner(
    state: &AppState,
    user_id: Uuid,
    req: ScoreRequest,
) -> (StatusCode, serde_json::Value) {
    let result = scores::submit(state.store.as_ref(), user_id, req).await;
    respond(StatusCode::CREATED, result)
}

pub async fn my_scores_inner(state: &AppState, user_id: Uuid) -> (StatusCode, serde_json::Value) {
    respond(StatusCode::OK, scores::history(state.store.as_ref(), user_id).await)
}

pub async fn profile_inner(state: &AppState, user_id: Uuid) -> (StatusCode, serde_json::Value) {
    respond(StatusCode::OK, accounts::profile(state.store.as_ref(), user_id).await)
}

pub async fn update_profile_inner(
    state: &AppState,
    user_id: Uuid,
    update: ProfileUpdate,
) -> (StatusCode, serde_json::Value) {
    let result = accounts::update_profile(state.store.as_ref(), user_id, update).await;
    respond(StatusCode::OK, result)
}

pub async fn leaderboard_inner(state: &AppState, query: LeaderboardQuery) -> (StatusCode, serde_json::Value) {
    let result = leaderboard::top_scores(state.store.as_ref(), query, state.config.leaderboard.limit).await;
    respond(StatusCode::OK, result)
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => register_inner(&state, req).await,
        Err(rejection) => ApiError::from(rejection).into_parts(),
    };
    (status, Json(body))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => login_inner(&state, req).await,
        Err(rejection) => ApiError::from(rejection).into_parts(),
    };
    (status, Json(body))
}

pub async fn submit_score_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => submit_score_inner(&state, claims.user_id, req).await,
        Err(rejection) => ApiError::from(rejection).into_parts(),
    };
    (status, Json(body))
}

pub async fn my_scores_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> impl IntoResponse {
    let (status, body) = my_scores_inner(&state, claims.user_id).await;
    (status, Json(body))
}

pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> impl IntoResponse {
    let (status, body) = profile_inner(&state, claims.user_id).await;
    (status, Json(body))
}

pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(update)) => update_profile_inner(&state, claims.user_id, update).await,
        Err(rejection) => ApiError::from(rejection).into_parts(),
    };
    (status, Json(body))
}

pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> impl IntoResponse {
    let (status, body) = match query {
        Ok(Query(query)) => leaderboard_inner(&state, query).await,
        Err(rejection) => ApiError::from(rejection).into_parts(),
    };
    (status, Json(body))
}

// ============================================================================
// Unit Tests: call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reactx_core::MemoryStore;

    fn make_state() -> AppState {
        let mut config = ReactxConfig::in_memory();
        config.auth.bcrypt_cost = 4;
        config.auth.jwt_secret = "unit-test".to_string();
        AppState::new(Arc::new(MemoryStore::new()), config)
    }

    fn register_req(name: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(format!("{}@example.com", name)),
            username: Some(name.to_string()),
            password: Some("secret1".to_string()),
            avatar_key: Some("avatar1".to_string()),
        }
    }

    async fn registered_user(state: &AppState, name: &str) -> Uuid {
        let (status, body) = register_inner(state, register_req(name)).await;
        assert_eq!(status, StatusCode::CREATED, "{:?}", body);
        body["user"]["id"].as_str().unwrap().parse().unwrap()
    }

    // ========================================================================
    // TEST 1: version_inner is pure and returns correct fields
    // ========================================================================
    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["api"], "reactx/1");
    }

    // ========================================================================
    // TEST 2: health_inner reports the memory store as healthy
    // ========================================================================
    #[tokio::test]
    async fn test_health_inner_memory_store() {
        let state = make_state();
        let (status, body) = health_inner(state.store.as_ref()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "memory");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    // ========================================================================
    // TEST 3: register returns token and public user, never the hash
    // ========================================================================
    #[tokio::test]
    async fn test_register_inner_created() {
        let state = make_state();
        let (status, body) = register_inner(&state, register_req("ann")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully.");
        assert!(body["token"].is_string());
        assert_eq!(body["user"]["username"], "ann");
        assert!(body["user"].get("password_hash").is_none());
    }

    // ========================================================================
    // TEST 4: duplicate registration is a conflict
    // ========================================================================
    #[tokio::test]
    async fn test_register_inner_conflict() {
        let state = make_state();
        registered_user(&state, "ann").await;
        let (status, body) = register_inner(&state, register_req("ann")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], "error");
    }

    // ========================================================================
    // TEST 5: login with wrong password is 401, right password 200
    // ========================================================================
    #[tokio::test]
    async fn test_login_inner() {
        let state = make_state();
        registered_user(&state, "ann").await;

        let bad = LoginRequest {
            email: Some("ann@example.com".into()),
            password: Some("nope-nope".into()),
        };
        let (status, body) = login_inner(&state, bad).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials.");

        let unknown = LoginRequest {
            email: Some("bob@example.com".into()),
            password: Some("secret1".into()),
        };
        assert_eq!(login_inner(&state, unknown).await.0, StatusCode::UNAUTHORIZED);

        let good = LoginRequest {
            email: Some("ann@example.com".into()),
            password: Some("secret1".into()),
        };
        let (status, body) = login_inner(&state, good).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful.");

        let (status, _) = login_inner(&state, LoginRequest::default()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ========================================================================
    // TEST 6: submit_score validates and stores
    // ========================================================================
    #[tokio::test]
    async fn test_submit_score_inner() {
        let state = make_state();
        let user_id = registered_user(&state, "ann").await;

        let req = ScoreRequest {
            game_type: Some("visual_choice".into()),
            difficulty: Some("medium".into()),
            avg_score_time_ms: Some(216),
            avg_accuracy: Some(0.667),
        };
        let (status, body) = submit_score_inner(&state, user_id, req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["avg_score_time_ms"], 216);
        assert_eq!(body["game_type"], "visual_choice");

        let bad = ScoreRequest {
            game_type: Some("tetris".into()),
            ..ScoreRequest::default()
        };
        let (status, body) = submit_score_inner(&state, user_id, bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, body) = my_scores_inner(&state, user_id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    // ========================================================================
    // TEST 7: profile of an unknown user is 404
    // ========================================================================
    #[tokio::test]
    async fn test_profile_inner_not_found() {
        let state = make_state();
        let (status, _) = profile_inner(&state, Uuid::new_v4()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ========================================================================
    // TEST 8: empty profile update is 400
    // ========================================================================
    #[tokio::test]
    async fn test_update_profile_inner_requires_field() {
        let state = make_state();
        let user_id = registered_user(&state, "ann").await;
        let (status, body) = update_profile_inner(&state, user_id, ProfileUpdate::default()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No fields to update.");
    }

    // ========================================================================
    // TEST 9: leaderboard rejects an unknown game filter
    // ========================================================================
    #[tokio::test]
    async fn test_leaderboard_inner_bad_filter() {
        let state = make_state();
        let query = LeaderboardQuery {
            game: Some("pong".into()),
            difficulty: None,
        };
        let (status, _) = leaderboard_inner(&state, query).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = leaderboard_inner(&state, LeaderboardQuery::default()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }
}
