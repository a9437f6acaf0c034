//! Message-bus request screening.
//!
//! Routes fed by the internal message broker only accept requests that carry
//! the broker's user agent and, when enabled, originate from an allowed peer
//! address. Encrypted payloads are decrypted here so handlers always see
//! plain JSON.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{
        HeaderValue,
        header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
    },
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

/// Upper bound on a broker message body.
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Screening middleware function.
///
/// # Flow
///
/// 1. `User-Agent` must equal `MSG_QUEUE_USER_AGENT`
/// 2. With `MSG_QUEUE_URL_CHECK`, the peer must be listed in `MSG_QUEUE_ALLOWED_URLS`
/// 3. With `MSG_QUEUE_KEY`, the body is decrypted and replaced by the plaintext
///
/// # Errors
///
/// - `UnauthorizedAgent` / `UnauthorizedOrigin`: request not from the broker (401)
/// - `MessageExtraction`: body could not be read or decrypted (500)
pub async fn screen_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let config = &state.config;

    // Step 1: Only the broker's user agent may call these routes
    let agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if agent != config.msg_queue_user_agent {
        tracing::warn!(user_agent = %agent, "rejected request from unexpected agent");
        return Err(AppError::UnauthorizedAgent);
    }

    // Step 2: Optionally pin the caller to known broker addresses
    if config.msg_queue_url_check {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        if !peer.is_some_and(|addr| is_allowed_peer(&config.msg_queue_allowed_urls, addr)) {
            tracing::warn!(?peer, "rejected request from unlisted peer");
            return Err(AppError::UnauthorizedOrigin);
        }
    }

    // Step 3: Plain JSON passes straight through when no key is configured
    let Some(cipher) = state.cipher.as_deref() else {
        return Ok(next.run(request).await);
    };

    // Step 4: Buffer and decrypt the message
    let (mut parts, body) = request.into_parts();
    let payload = axum::body::to_bytes(body, MAX_MESSAGE_BYTES)
        .await
        .map_err(|e| AppError::MessageExtraction(e.to_string()))?;
    let plaintext = cipher
        .decrypt(&payload)
        .map_err(|e| AppError::MessageExtraction(e.to_string()))?;

    // Step 5: Hand the plaintext to the handler as a JSON body
    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(next.run(Request::from_parts(parts, Body::from(plaintext))).await)
}

/// Allow-list entries match either `ip:port` or a bare `ip`.
fn is_allowed_peer(allowed: &[String], addr: SocketAddr) -> bool {
    let full = addr.to_string();
    let ip = addr.ip().to_string();
    allowed
        .iter()
        .map(|entry| entry.trim())
        .any(|entry| entry == full || entry == ip)
}
