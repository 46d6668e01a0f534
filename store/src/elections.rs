//! Saved election history.

use crate::kv::KvStore;
use std::sync::Arc;
use voteth_types::{unix_now_ms, ElectionRecord, EthAddress};

/// Persisted key for the saved elections list (JSON array).
pub const SAVED_ELECTIONS_KEY: &str = "savedElections";

/// Maximum number of remembered elections; the oldest is evicted beyond this.
pub const MAX_SAVED: usize = 20;

/// Most-recent-first list of elections the user has switched to.
///
/// Append-only and deduplicated case-insensitively by contract address:
/// re-saving a known address is a no-op, records are never edited.
#[derive(Clone)]
pub struct ElectionHistory {
    kv: Arc<dyn KvStore>,
}

impl ElectionHistory {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// All saved elections, most recent first. A corrupt persisted list
    /// is treated as empty rather than an error.
    pub fn list(&self) -> Vec<ElectionRecord> {
        self.kv
            .get(SAVED_ELECTIONS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Remember an election, unless its address is already known.
    pub fn save(&self, address: EthAddress, name: impl Into<String>) {
        let mut elections = self.list();
        if elections.iter().any(|e| e.address == address) {
            return;
        }
        elections.insert(
            0,
            ElectionRecord {
                address,
                name: name.into(),
                saved_at_ms: unix_now_ms(),
            },
        );
        if elections.len() > MAX_SAVED {
            elections.pop();
        }
        match serde_json::to_string(&elections) {
            Ok(json) => self.kv.put(SAVED_ELECTIONS_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize election history"),
        }
    }
}
