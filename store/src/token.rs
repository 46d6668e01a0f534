//! Capability token persistence.

use crate::kv::KvStore;
use std::sync::Arc;
use voteth_types::{unix_now_ms, CapabilityToken};

/// Persisted key for the token value.
pub const TOKEN_KEY: &str = "face_verification_token";
/// Persisted key for the absolute expiry (epoch milliseconds, as a string).
pub const EXPIRY_KEY: &str = "face_verification_expiry";

/// Persistence and validity checking for the capability token.
///
/// The store never retains a stale token: a read that finds an expired
/// entry purges it before reporting absence. Only the face verification
/// manager writes tokens (`set`); everything else reads.
#[derive(Clone)]
pub struct TokenStore {
    kv: Arc<dyn KvStore>,
}

impl TokenStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Whether a valid (present and unexpired) token exists.
    ///
    /// Side effect: an expired entry is removed from the backing store
    /// before this returns false.
    pub fn has(&self) -> bool {
        self.load(unix_now_ms()).is_some()
    }

    /// The current token, or `None` when absent or expired (expired
    /// entries are purged, as in [`TokenStore::has`]).
    pub fn get(&self) -> Option<CapabilityToken> {
        self.load(unix_now_ms())
    }

    /// Store a freshly issued token.
    pub fn set(&self, token: &CapabilityToken) {
        self.kv.put(TOKEN_KEY, &token.value);
        self.kv.put(EXPIRY_KEY, &token.expires_at_ms.to_string());
    }

    /// Remove any stored token.
    pub fn clear(&self) {
        self.kv.remove(TOKEN_KEY);
        self.kv.remove(EXPIRY_KEY);
    }

    fn load(&self, now_ms: u64) -> Option<CapabilityToken> {
        let value = self.kv.get(TOKEN_KEY);
        let expires_at_ms = self
            .kv
            .get(EXPIRY_KEY)
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(0);

        match value {
            Some(value) if now_ms < expires_at_ms => Some(CapabilityToken {
                value,
                // The similarity score is not persisted; it only matters at
                // issue time for the verification result message.
                score: 0.0,
                expires_at_ms,
            }),
            Some(_) => {
                tracing::debug!("purging expired verification token");
                self.clear();
                None
            }
            None => None,
        }
    }
}
