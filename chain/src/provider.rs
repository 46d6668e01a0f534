//! Injected Ethereum provider abstraction.
//!
//! An injected provider is an opaque JSON request surface plus an event
//! surface (EIP-1193 shape). The connector and gateway depend only on
//! this trait; tests drive it through a controllable double.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::Value;
use voteth_types::WalletKind;

/// Capability flags an injected provider advertises about itself.
///
/// Populated once at connect time; the flags are advisory and several
/// wallets set more than one, so classification applies a fixed order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProviderFlags {
    pub is_metamask: bool,
    pub is_phantom: bool,
    pub is_coinbase: bool,
    pub is_brave: bool,
    pub is_trust: bool,
}

/// Derive the display-only wallet tag from capability flags.
///
/// Phantom impersonates MetaMask, so the phantom flag wins over the
/// metamask flag. Unrecognized combinations fall back to `Unknown`.
pub fn classify_wallet(flags: ProviderFlags) -> WalletKind {
    if flags.is_phantom {
        WalletKind::Phantom
    } else if flags.is_metamask {
        WalletKind::MetaMask
    } else if flags.is_coinbase {
        WalletKind::Coinbase
    } else if flags.is_brave {
        WalletKind::Brave
    } else if flags.is_trust {
        WalletKind::Trust
    } else {
        WalletKind::Unknown
    }
}

/// Provider-level events the connector subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderEvent {
    AccountsChanged,
    ChainChanged,
    Connect,
    Disconnect,
}

/// Handle identifying one subscription, so `unsubscribe` removes exactly
/// the handler that was registered and never listeners owned by others.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback invoked with the event payload.
pub type EventHandler = Box<dyn Fn(&Value) + Send + Sync>;

/// An injected Ethereum provider (EIP-1193 shape).
#[async_trait]
pub trait EthereumProvider: Send + Sync {
    /// Issue a request: wallet methods (`eth_requestAccounts`,
    /// `eth_chainId`, `wallet_switchEthereumChain`, …) or contract calls
    /// routed through the signer.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Capability flags for wallet-kind classification.
    fn flags(&self) -> ProviderFlags;

    /// Register a handler; the returned id deregisters exactly it.
    fn subscribe(&self, event: ProviderEvent, handler: EventHandler) -> SubscriptionId;

    /// Remove one previously registered handler. Returns whether a
    /// handler was actually removed.
    fn unsubscribe(&self, event: ProviderEvent, id: SubscriptionId) -> bool;

    /// Number of currently registered handlers for an event.
    fn listener_count(&self, event: ProviderEvent) -> usize;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Controllable provider double for connector and gateway tests.

    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    type Scripted = Box<dyn Fn(&str, &Value) -> Result<Value, ProviderError> + Send + Sync>;

    /// Provider double: scripted responses, recorded requests, manually
    /// fired events.
    pub struct MockProvider {
        pub flags: ProviderFlags,
        script: Scripted,
        requests: Mutex<Vec<(String, Value)>>,
        handlers: Mutex<HashMap<ProviderEvent, Vec<(SubscriptionId, EventHandler)>>>,
        next_id: AtomicU64,
        /// Queued one-shot overrides consumed before the script.
        overrides: Mutex<VecDeque<(String, Result<Value, ProviderError>)>>,
    }

    impl MockProvider {
        pub fn new(
            flags: ProviderFlags,
            script: impl Fn(&str, &Value) -> Result<Value, ProviderError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                flags,
                script: Box::new(script),
                requests: Mutex::new(Vec::new()),
                handlers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                overrides: Mutex::new(VecDeque::new()),
            }
        }

        /// Default happy-path provider: one account, already on `chain_id`.
        pub fn connected(chain_id: u64) -> Self {
            Self::new(ProviderFlags { is_metamask: true, ..Default::default() }, move |method, _| {
                match method {
                    "eth_requestAccounts" | "eth_accounts" => Ok(serde_json::json!([
                        "0x61F1d0760aeABB09BFdCF2594ed515725589e73e"
                    ])),
                    "eth_chainId" => Ok(Value::String(format!("0x{chain_id:x}"))),
                    other => Err(ProviderError::new(format!("unscripted method {other}"))),
                }
            })
        }

        pub fn push_override(&self, method: &str, result: Result<Value, ProviderError>) {
            self.overrides
                .lock()
                .unwrap()
                .push_back((method.to_string(), result));
        }

        pub fn requests(&self) -> Vec<(String, Value)> {
            self.requests.lock().unwrap().clone()
        }

        /// Fire an event to all registered handlers, as the wallet would.
        pub fn emit(&self, event: ProviderEvent, payload: Value) {
            let handlers = self.handlers.lock().unwrap();
            if let Some(list) = handlers.get(&event) {
                for (_, handler) in list {
                    handler(&payload);
                }
            }
        }

        pub fn total_listeners(&self) -> usize {
            self.handlers
                .lock()
                .unwrap()
                .values()
                .map(|list| list.len())
                .sum()
        }
    }

    #[async_trait]
    impl EthereumProvider for MockProvider {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
            self.requests
                .lock()
                .unwrap()
                .push((method.to_string(), params.clone()));
            let mut overrides = self.overrides.lock().unwrap();
            if let Some(pos) = overrides.iter().position(|(m, _)| m == method) {
                let (_, result) = overrides.remove(pos).unwrap();
                return result;
            }
            drop(overrides);
            (self.script)(method, &params)
        }

        fn flags(&self) -> ProviderFlags {
            self.flags
        }

        fn subscribe(&self, event: ProviderEvent, handler: EventHandler) -> SubscriptionId {
            let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
            self.handlers
                .lock()
                .unwrap()
                .entry(event)
                .or_default()
                .push((id, handler));
            id
        }

        fn unsubscribe(&self, event: ProviderEvent, id: SubscriptionId) -> bool {
            let mut handlers = self.handlers.lock().unwrap();
            if let Some(list) = handlers.get_mut(&event) {
                let before = list.len();
                list.retain(|(sub_id, _)| *sub_id != id);
                return list.len() < before;
            }
            false
        }

        fn listener_count(&self, event: ProviderEvent) -> usize {
            self.handlers
                .lock()
                .unwrap()
                .get(&event)
                .map_or(0, |list| list.len())
        }
    }
}
