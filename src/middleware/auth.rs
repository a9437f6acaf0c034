//! Session token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the session token from the configured cookie
//! 2. Verify its HS256 signature and expiry
//! 3. Inject the caller's user id into the request
//! 4. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{Algorithm, Validation, decode, errors::ErrorKind};
use serde::Deserialize;
use serde_json::Value;

use crate::{error::AppError, state::AppState};

/// Authenticated caller attached to the request's extensions.
///
/// Handlers extract it with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Claims carried by session tokens issued by the identity service.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    user_id: Option<String>,
}

/// Authentication middleware function.
///
/// # Flow
///
/// 1. Read the cookie named by `COOKIE_NAME`
/// 2. Decode and verify the token with `JWT_SECRET`
/// 3. Insert `AuthUser` into request extensions and call the next handler
///
/// # Errors
///
/// - `MissingToken` / `EmptyToken`: no usable cookie (401)
/// - `TokenExpired`: `exp` is in the past (401)
/// - `InvalidToken`: bad signature, malformed token, missing `exp` (401)
/// - `MalformedClaims` / `MissingUserId`: verified token with unusable claims (500)
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Step 1: Extract the session cookie
    let token = session_cookie(request.headers(), &state.config.cookie_name)
        .ok_or(AppError::MissingToken)?;
    if token.is_empty() {
        return Err(AppError::EmptyToken);
    }

    // Step 2: Verify the token and pull out the user id
    let user_id = verify_token(&token, &state)?;

    // Step 3: Make the caller available to handlers
    request.extensions_mut().insert(AuthUser { user_id });

    // Step 4: Continue to the handler
    Ok(next.run(request).await)
}

/// Value of the cookie `name`, searching every `Cookie` header.
fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value_trimmed().to_string())
}

/// Verify `token` and return the user id it carries.
///
/// # Arguments
///
/// * `token` - Raw cookie value
/// * `state` - Holds the decoding key
///
/// Claims are decoded as plain JSON first, so header or payload garbage is
/// rejected as a non-matching token before the claim shape is looked at.
fn verify_token(token: &str, state: &AppState) -> Result<String, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expired means expired: no grace period
    validation.leeway = 0;

    // Step 1: signature, expiry and JSON structure
    let data = decode::<Value>(token, &state.jwt_key, &validation).map_err(|e| {
        tracing::warn!(error = %e, "rejected session token");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    })?;

    // Step 2: the token is genuine, now its claims must have the expected shape
    let claims: Claims = serde_json::from_value(data.claims).map_err(|e| {
        tracing::error!(error = %e, "session token claims have unexpected shape");
        AppError::MalformedClaims
    })?;

    claims.user_id.ok_or(AppError::MissingUserId)
}
