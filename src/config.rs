//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `JWT_SECRET` (required): HS256 secret used to verify session tokens
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `SERVICE_ROUTE_VERSION` (optional): path prefix for every route, e.g. `v1`
/// - `COOKIE_NAME` (optional): cookie carrying the session token, defaults to `token`
/// - `CACHE_TTL_SECS` (optional): lifetime of cached responses, defaults to 60
/// - `MSG_QUEUE_*` (optional): message broker settings, see the fields below
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub jwt_secret: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub service_route_version: String,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Base URL of the message broker, `/msg/publish` is appended when publishing
    #[serde(default = "default_msg_queue_svc_url")]
    pub msg_queue_svc_url: String,

    #[serde(default = "default_msg_queue_pub_id")]
    pub msg_queue_pub_id: String,

    /// Channel receiving account creation events
    #[serde(default = "default_msg_queue_channel")]
    pub msg_queue_channel: String,

    /// User agent the broker sends when delivering messages to this service
    #[serde(default = "default_msg_queue_user_agent")]
    pub msg_queue_user_agent: String,

    #[serde(default)]
    pub msg_queue_url_check: bool,

    /// Comma separated peer addresses (`ip` or `ip:port`) allowed to deliver messages
    #[serde(default)]
    pub msg_queue_allowed_urls: Vec<String>,

    /// Hex encoded 32 byte AES-256-GCM key; when unset message bodies are not decrypted
    #[serde(default)]
    pub msg_queue_key: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_cookie_name() -> String {
    "token".to_string()
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_msg_queue_svc_url() -> String {
    "http://localhost:9091".to_string()
}

fn default_msg_queue_pub_id() -> String {
    "account-management-svc".to_string()
}

fn default_msg_queue_channel() -> String {
    "new_account".to_string()
}

fn default_msg_queue_user_agent() -> String {
    "msgbroker".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Route prefix derived from `SERVICE_ROUTE_VERSION`, `None` when routes are served at the root.
    pub fn route_prefix(&self) -> Option<String> {
        let version = self.service_route_version.trim_matches('/');
        if version.is_empty() {
            None
        } else {
            Some(format!("/{version}"))
        }
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by unit tests; no environment is read.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/accounts_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_port: default_port(),
            service_route_version: String::new(),
            cookie_name: default_cookie_name(),
            cache_ttl_secs: default_cache_ttl(),
            msg_queue_svc_url: default_msg_queue_svc_url(),
            msg_queue_pub_id: default_msg_queue_pub_id(),
            msg_queue_channel: default_msg_queue_channel(),
            msg_queue_user_agent: default_msg_queue_user_agent(),
            msg_queue_url_check: false,
            msg_queue_allowed_urls: Vec::new(),
            msg_queue_key: None,
        }
    }
}
