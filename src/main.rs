//! Account Management Service - Main Application Entry Point
//!
//! REST API server that owns user accounts: their running income and spend
//! totals and the services they have activated. Accounts are created and
//! credited by the internal message broker; end users read their account and
//! toggle services with a session token.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: HS256 session token carried in a cookie
//! - **Caching**: in-process TTL cache for account summaries
//! - **Format**: JSON `{status, message, data}` envelopes
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Wire the store, broker publisher and optional message cipher
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod cache;
mod config;
mod crypto;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod repository;
mod response;
mod router;
mod services;
mod state;
#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use crate::{
    crypto::MessageCipher, repository::PgAccountStore, services::publisher::HttpPublisher,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let publisher = HttpPublisher::new(
        &config.msg_queue_svc_url,
        config.msg_queue_pub_id.clone(),
        config.msg_queue_channel.clone(),
    )?;
    tracing::info!(endpoint = %publisher.endpoint(), "Broker publisher ready");

    let cipher = config
        .msg_queue_key
        .as_deref()
        .map(MessageCipher::from_hex)
        .transpose()?;
    if cipher.is_none() {
        tracing::warn!("MSG_QUEUE_KEY not set, broker messages are accepted as plain JSON");
    }

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(
        config,
        Arc::new(PgAccountStore::new(pool)),
        Arc::new(publisher),
        cipher,
    );
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Peer addresses feed the broker allow-list check
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
