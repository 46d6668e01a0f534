//! Election bookkeeping types.

use crate::EthAddress;
use serde::{Deserialize, Serialize};

/// A locally saved election: which contract it lives at and what the user
/// called it. History entries are append-only and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectionRecord {
    pub address: EthAddress,
    pub name: String,
    /// When the record was saved, epoch milliseconds.
    pub saved_at_ms: u64,
}

/// One candidate row as displayed: derived from the ledger on every poll,
/// never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateView {
    pub index: u32,
    pub name: String,
    pub vote_count: u64,
}

/// Which on-chain view a periodic task refreshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PollKind {
    /// Voting status + remaining time (homepage).
    Status,
    /// Final candidate tallies (results page).
    Results,
}
