//! Registration, login and profile management.

use reactx_core::api::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest};
use reactx_core::models::{NewUser, User};
use reactx_core::Store;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::error::ApiError;

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

pub async fn register(
    store: &dyn Store,
    tokens: &TokenService,
    bcrypt_cost: u32,
    req: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    let reg = req.validate()?;
    let password_hash = hash_password(reg.password, bcrypt_cost).await?;

    let user = store
        .create_user(NewUser {
            email: reg.email,
            username: reg.username,
            password_hash,
            avatar_key: reg.avatar_key,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    let token = tokens.issue(&user)?;
    Ok(AuthResponse {
        message: "User registered successfully.".to_string(),
        token,
        user,
    })
}

pub async fn login(
    store: &dyn Store,
    tokens: &TokenService,
    req: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let (email, password) = req.validate()?;

    let Some(stored) = store.find_user_by_email(&email).await? else {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };
    if !verify_password(password, stored.password_hash.clone()).await? {
        tracing::debug!(user_id = %stored.id, "password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let user = stored.into_public();
    let token = tokens.issue(&user)?;
    Ok(AuthResponse {
        message: "Login successful.".to_string(),
        token,
        user,
    })
}

pub async fn profile(store: &dyn Store, user_id: Uuid) -> Result<User, ApiError> {
    store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))
}

pub async fn update_profile(
    store: &dyn Store,
    user_id: Uuid,
    update: ProfileUpdate,
) -> Result<User, ApiError> {
    let update = update.validate()?;
    store
        .update_user(user_id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))
}
