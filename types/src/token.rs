//! Capability token produced by a successful biometric verification.

use serde::{Deserialize, Serialize};

/// A short-lived, locally held credential asserting "the user recently
/// passed face verification".
///
/// Advisory only: it gates the client-side vote action to avoid a doomed
/// transaction, but the ledger contract remains the authority on whether
/// an address may vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapabilityToken {
    /// Opaque token value issued by the verification service.
    pub value: String,
    /// Similarity score (0..100) reported at issue time.
    pub score: f64,
    /// Absolute expiry, epoch milliseconds.
    pub expires_at_ms: u64,
}

impl CapabilityToken {
    /// Build a token from a verify response, anchoring the relative
    /// `expires_in_secs` to the caller's clock.
    pub fn issued(value: impl Into<String>, score: f64, expires_in_secs: u64, now_ms: u64) -> Self {
        Self {
            value: value.into(),
            score,
            expires_at_ms: now_ms.saturating_add(expires_in_secs.saturating_mul(1000)),
        }
    }

    /// A token is valid strictly before its expiry instant.
    pub fn is_valid(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }
}
