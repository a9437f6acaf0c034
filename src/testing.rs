//! Shared fixtures for unit tests.

use std::sync::Arc;

use axum::response::Response;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::{
    config::Config,
    crypto::MessageCipher,
    repository::memory::InMemoryAccountStore,
    services::publisher::testing::RecordingPublisher,
    state::AppState,
};

/// Application state wired to in-memory doubles.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryAccountStore>,
    /// Messages published to the broker
    pub messages: mpsc::UnboundedReceiver<String>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::for_tests(), None)
    }

    pub fn with_config(config: Config, cipher: Option<MessageCipher>) -> Self {
        let store = Arc::new(InMemoryAccountStore::new());
        let (publisher, messages) = RecordingPublisher::new();
        let state = AppState::new(config, store.clone(), Arc::new(publisher), cipher);

        Self {
            state,
            store,
            messages,
        }
    }
}

/// HS256 token over arbitrary claims.
pub fn sign_token(secret: &str, claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Valid session token for `user_id`, signed with the state's secret.
pub fn session_token(state: &AppState, user_id: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    sign_token(
        &state.config.jwt_secret,
        json!({ "user_id": user_id, "exp": exp }),
    )
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
