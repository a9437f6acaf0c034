//! Data models representing database entities and API payloads.

/// Account entity and summary projection
pub mod account;
/// Service and transaction update payloads and column mutations
pub mod update;
