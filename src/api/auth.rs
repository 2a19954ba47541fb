//! Session-based authentication: signup, login and the bearer-token guard.
//!
//! Tokens are opaque 32-byte random strings, URL-safe base64 encoded. Only a
//! sha256 digest of the token is persisted; the plaintext token never touches
//! disk. Sessions expire after a configurable number of days and expired
//! tokens are rejected at resolution time.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap},
    Json,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name, validate_password};
use crate::db::{
    AuthResponse, DbPool, LoginRequest, ProfileResponse, Session, SignupRequest, User,
    UserResponse,
};
use crate::AppState;

/// Authentication failure taxonomy. Every variant is client-facing and
/// surfaced as a 4xx response.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyRegistered,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyRegistered => ApiError::bad_request(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::UserNotFound => ApiError::unauthorized(err.to_string()),
        }
    }
}

/// The resolved authenticated identity attached to a request: the user
/// record plus the session it authenticated with.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub session: Session,
}

/// Hash a password into its stored credential digest.
///
/// Deterministic sha256, no salt. Stored digests are verified by recomputing
/// this transform, so the string-in/string-out contract must stay stable.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a password against a stored digest using constant-time comparison
pub fn verify_password(password: &str, digest: &str) -> bool {
    let computed = hash_password(password);
    computed.as_bytes().ct_eq(digest.as_bytes()).into()
}

/// Generate a random session token (32 bytes of entropy, URL-safe)
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the bearer token from request headers
fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingToken)
}

/// Issue a new session for a user and return the plaintext token.
///
/// The unique index on token_hash rejects the (negligible-probability)
/// collision with an existing token instead of overwriting it.
async fn issue_session(pool: &DbPool, user_id: &str, ttl_days: i64) -> Result<String, ApiError> {
    let token = generate_token();
    let token_hash = hash_token(&token);

    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::days(ttl_days);

    let session_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(&token_hash)
    .bind(now.to_rfc3339())
    .bind(expires_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(token)
}

/// Resolve a presented token to its principal.
///
/// Rejects unknown and expired tokens alike with `InvalidToken`. The owning
/// user is re-fetched on every resolution; a dangling session (user row gone)
/// fails with `UserNotFound`.
pub async fn resolve_principal(pool: &DbPool, token: &str) -> Result<Principal, ApiError> {
    let token_hash = hash_token(token);

    let session: Option<Session> = sqlx::query_as("SELECT * FROM sessions WHERE token_hash = ?")
        .bind(&token_hash)
        .fetch_optional(pool)
        .await?;
    let session = session.ok_or(AuthError::InvalidToken)?;

    // An unparseable expiry counts as expired
    let expired = chrono::DateTime::parse_from_rfc3339(&session.expires_at)
        .map(|t| t.with_timezone(&chrono::Utc) <= chrono::Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(AuthError::InvalidToken.into());
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?;
    let user = user.ok_or(AuthError::UserNotFound)?;

    Ok(Principal { user, session })
}

/// Extractor for the authenticated principal, used as the guard on every
/// protected endpoint.
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)?;
        resolve_principal(&state.db, token).await
    }
}

fn validate_signup(req: &SignupRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name) {
        errors.add("name", e);
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", e);
    }
    if let Err(e) = validate_password(&req.password) {
        errors.add("password", e);
    }

    errors.finish()
}

/// Signup endpoint
///
/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_signup(&req)?;

    // Emails are stored lowercased so uniqueness is case-insensitive
    let email = req.email.trim().to_lowercase();

    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AuthError::EmailAlreadyRegistered.into());
    }

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    // The unique index on email makes the insert itself race-free; the
    // pre-check above only exists for the friendly early error.
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, plan, created_at, updated_at)
         VALUES (?, ?, ?, ?, 'free', ?, ?)",
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&email)
    .bind(hash_password(&req.password))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::from(AuthError::EmailAlreadyRegistered)
        } else {
            tracing::error!("Failed to create user: {}", e);
            ApiError::database("A database error occurred")
        }
    })?;

    tracing::info!(user_id = %id, "User signed up");

    let token = issue_session(&state.db, &id, state.config.auth.session_ttl_days).await?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse {
            id,
            name: req.name,
            email,
        },
    }))
}

/// Login endpoint
///
/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // Unknown email and wrong password must be indistinguishable to the caller
    let user = user.ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }

    // A fresh session every login; earlier sessions stay valid
    let token = issue_session(&state.db, &user.id, state.config.auth.session_ttl_days).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Current user profile
///
/// GET /me
pub async fn me(principal: Principal) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(principal.user))
}
