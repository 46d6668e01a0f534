//! Scripted provider double for orchestration tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use voteth_chain::{
    EthereumProvider, EventHandler, ProviderError, ProviderEvent, ProviderFlags, SubscriptionId,
};

pub const TEST_ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

/// Provider double with a healthy wallet/contract script; individual
/// responses can be bent per test.
pub struct ScriptedProvider {
    pub chain_id: Mutex<u64>,
    /// `(code, message)` to fail the next `vote` request with.
    pub vote_failure: Mutex<Option<(Option<i64>, String)>>,
    /// What `eth_getCode` reports; `"0x"` means no contract.
    pub code_at_address: Mutex<String>,
    pub fail_code_check: Mutex<bool>,
    requests: Mutex<Vec<(String, Value)>>,
    handlers: Mutex<HashMap<ProviderEvent, Vec<SubscriptionId>>>,
    next_id: AtomicU64,
}

impl ScriptedProvider {
    pub fn sepolia() -> Self {
        Self {
            chain_id: Mutex::new(voteth_chain::SEPOLIA_CHAIN_ID),
            vote_failure: Mutex::new(None),
            code_at_address: Mutex::new("0x6001".to_string()),
            fail_code_check: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
            handlers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn requests_named(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl EthereumProvider for ScriptedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), params));
        match method {
            "eth_requestAccounts" => Ok(json!([TEST_ACCOUNT])),
            "eth_chainId" => Ok(json!(format!("0x{:x}", *self.chain_id.lock().unwrap()))),
            "wallet_switchEthereumChain" => Ok(Value::Null),
            "vote" => match self.vote_failure.lock().unwrap().take() {
                Some((Some(code), message)) => Err(ProviderError::with_code(code, message)),
                Some((None, message)) => Err(ProviderError::new(message)),
                None => Ok(json!("0xf00dfeed")),
            },
            "waitForTransaction" => Ok(json!(true)),
            "eth_getCode" => {
                if *self.fail_code_check.lock().unwrap() {
                    return Err(ProviderError::new("provider unavailable"));
                }
                Ok(json!(self.code_at_address.lock().unwrap().clone()))
            }
            "getVotingStatus" => Ok(json!(true)),
            "getRemainingTime" => Ok(json!(120)),
            "getAllVotesOfCandidates" => {
                Ok(json!([{ "name": "Ada", "voteCount": 3 }]))
            }
            _ => Ok(Value::Null),
        }
    }

    fn flags(&self) -> ProviderFlags {
        ProviderFlags {
            is_metamask: true,
            ..ProviderFlags::default()
        }
    }

    fn subscribe(&self, event: ProviderEvent, _handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().unwrap().entry(event).or_default().push(id);
        id
    }

    fn unsubscribe(&self, event: ProviderEvent, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock().unwrap();
        let Some(list) = handlers.get_mut(&event) else {
            return false;
        };
        let before = list.len();
        list.retain(|registered| *registered != id);
        list.len() < before
    }

    fn listener_count(&self, event: ProviderEvent) -> usize {
        self.handlers
            .lock()
            .unwrap()
            .get(&event)
            .map_or(0, Vec::len)
    }
}
