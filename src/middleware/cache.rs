//! Response cache middleware.
//!
//! Successful responses are captured and replayed verbatim for later
//! requests with the same key until the configured TTL runs out.

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::Response,
};

use crate::{
    cache::CachedResponse, error::AppError, middleware::auth::AuthUser, state::AppState,
};

/// How cache keys are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    /// Keyed by URL only; every caller shares the entry.
    Shared,
    /// Keyed by URL and the authenticated user; requires [`AuthUser`].
    PerUser,
}

/// Cache middleware function.
///
/// # Flow
///
/// 1. Build the key from the request URI (and user id for [`CacheScope::PerUser`])
/// 2. On a hit, return the stored status, body and content type
/// 3. On a miss, run the handler and store its response if the status is 2xx
///
/// Install with `from_fn_with_state((state, scope), cache_middleware)`, inside
/// the authentication layer when the scope is per user.
pub async fn cache_middleware(
    State((state, scope)): State<(AppState, CacheScope)>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = cache_key(&request, scope)?;

    if let Some(cached) = state.cache.get(&key) {
        tracing::debug!(%key, "cache hit");
        return Ok(replay(cached));
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::Internal(format!("failed to buffer response: {e}")))?;

    state.cache.set(
        key,
        CachedResponse {
            status: parts.status,
            body: body.clone(),
            content_type: parts.headers.get(CONTENT_TYPE).cloned(),
        },
    );

    Ok(Response::from_parts(parts, Body::from(body)))
}

/// Key for `request`: the URI as the client sent it, before any nest prefix was stripped.
fn cache_key(request: &Request, scope: CacheScope) -> Result<String, AppError> {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.to_string())
        .unwrap_or_else(|| request.uri().to_string());

    match scope {
        CacheScope::Shared => Ok(uri),
        CacheScope::PerUser => {
            let user = request
                .extensions()
                .get::<AuthUser>()
                .ok_or(AppError::MissingSession)?;
            Ok(format!("{uri}/auth/{}", user.user_id))
        }
    }
}

fn replay(cached: CachedResponse) -> Response {
    let mut response = Response::new(Body::from(cached.body));
    *response.status_mut() = cached.status;
    if let Some(content_type) = cached.content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}
