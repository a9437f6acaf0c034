//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, session context)
//! 2. Delegates to the account service
//! 3. Returns a `{status, message, data}` envelope

/// Account management endpoints
pub mod accounts;
/// Health check and fallbacks
pub mod health;
