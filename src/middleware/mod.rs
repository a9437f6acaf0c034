//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests
//! - Screen and decrypt message-bus deliveries
//! - Serve cached responses
//! - Short-circuit requests (reject unauthorized)

/// Session token authentication middleware
pub mod auth;
/// Response cache middleware
pub mod cache;
/// Message-bus request screening middleware
pub mod screen;
