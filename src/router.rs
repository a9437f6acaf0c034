//! HTTP router assembly.
//!
//! | Method | Path                          | Middleware               |
//! |--------|-------------------------------|--------------------------|
//! | GET    | `/health`                     |                          |
//! | POST   | `/new_account`                | screen                   |
//! | GET    | `/account`                    | auth, cache (per user)   |
//! | PUT    | `/account/update/service`     | auth                     |
//! | PUT    | `/account/update/transaction` | screen                   |
//!
//! Every route is nested under `/<SERVICE_ROUTE_VERSION>` when one is configured.

use std::any::Any;

use axum::{
    Router,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    error::AppError,
    handlers::{accounts, health},
    middleware::{
        auth::auth_middleware,
        cache::{CacheScope, cache_middleware},
        screen::screen_request,
    },
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    // Routes called by end users with a session cookie
    let authenticated_routes = Router::new()
        .route("/account", get(accounts::account_summary))
        // Cache sits inside authentication so it can key on the user id
        .route_layer(from_fn_with_state(
            (state.clone(), CacheScope::PerUser),
            cache_middleware,
        ))
        .route("/account/update/service", put(accounts::update_services))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    // Routes called by the internal message broker
    let broker_routes = Router::new()
        .route("/new_account", post(accounts::create_account))
        .route(
            "/account/update/transaction",
            put(accounts::update_transaction),
        )
        .route_layer(from_fn_with_state(state.clone(), screen_request));

    let routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(authenticated_routes)
        .merge(broker_routes)
        .method_not_allowed_fallback(health::method_not_allowed);

    let app = match state.config.route_prefix() {
        Some(prefix) => Router::new().nest(&prefix, routes),
        None => routes,
    };

    app.fallback(health::route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
