//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They validate requests, build storage mutations and emit notifications.

pub mod account_service;
pub mod publisher;
