//! Wallet session types.

use crate::EthAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Best-effort tag for which wallet extension provided the session.
///
/// Display-only: derived once at connect time from provider capability
/// flags and never consulted for behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletKind {
    MetaMask,
    Phantom,
    Coinbase,
    Brave,
    Trust,
    Unknown,
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletKind::MetaMask => "MetaMask",
            WalletKind::Phantom => "Phantom",
            WalletKind::Coinbase => "Coinbase Wallet",
            WalletKind::Brave => "Brave Wallet",
            WalletKind::Trust => "Trust Wallet",
            WalletKind::Unknown => "Web3 Wallet",
        };
        write!(f, "{name}")
    }
}

/// A live wallet session: connected address, wallet tag, and the network
/// the signer was validated against.
///
/// Exactly one session is live per client context. A session is never
/// mutated in place; account or chain changes destroy it and force a
/// full rebuild, because signer and network identity are coupled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub address: EthAddress,
    pub wallet: WalletKind,
    pub chain_id: u64,
}

impl WalletSession {
    /// Short human-readable label, e.g. `MetaMask connected: 0x61F1d0…e73e`.
    pub fn label(&self) -> String {
        format!("{} connected: {}", self.wallet, self.address.truncated())
    }
}
