//! Shared application state handed to handlers and middleware.

use std::sync::Arc;

use jsonwebtoken::DecodingKey;

use crate::{
    cache::ResponseCache,
    config::Config,
    crypto::MessageCipher,
    repository::AccountStore,
    services::publisher::MessagePublisher,
};

/// Cheaply cloneable bundle of every shared dependency.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn AccountStore>,
    pub publisher: Arc<dyn MessagePublisher>,
    pub cache: Arc<ResponseCache>,
    /// Key verifying HS256 session tokens
    pub jwt_key: Arc<DecodingKey>,
    /// Present when message-bus payloads are encrypted
    pub cipher: Option<Arc<MessageCipher>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn AccountStore>,
        publisher: Arc<dyn MessagePublisher>,
        cipher: Option<MessageCipher>,
    ) -> Self {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl()));
        let jwt_key = Arc::new(DecodingKey::from_secret(config.jwt_secret.as_bytes()));

        Self {
            config: Arc::new(config),
            store,
            publisher,
            cache,
            jwt_key,
            cipher: cipher.map(Arc::new),
        }
    }
}
