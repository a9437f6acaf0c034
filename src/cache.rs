//! In-process response cache.
//!
//! Entries expire after a fixed TTL. An expired entry is dropped when its key
//! is read, and every write sweeps all expired entries so keys that are never
//! read again do not accumulate.

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    http::{HeaderValue, StatusCode},
};
use dashmap::DashMap;

/// A captured response, replayed verbatim on a cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub content_type: Option<HeaderValue>,
}

#[derive(Debug)]
struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

/// Concurrent map of cache key to response.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.response.clone());
            }
        }

        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    /// Store `response` under `key`, sweeping expired entries first.
    pub fn set(&self, key: String, response: CachedResponse) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);

        let expires_at = now + self.ttl;
        self.entries.insert(
            key,
            Entry {
                response,
                expires_at,
            },
        );
    }
}

#[cfg(test)]
impl ResponseCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
