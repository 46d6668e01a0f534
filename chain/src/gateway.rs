//! Typed read/write façade over the voting contract.

use crate::error::{ProviderError, RpcError, VoteError};
use crate::provider::EthereumProvider;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use voteth_types::{CandidateView, EthAddress};

/// One status poll's worth of ledger state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub open: bool,
    pub remaining_seconds: u64,
}

/// A submitted but not yet included vote transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingVote {
    pub tx_hash: String,
}

/// Read seam the sync scheduler polls through; implemented by
/// [`ContractGateway`] and by test doubles.
#[async_trait]
pub trait ElectionReader: Send + Sync {
    async fn status(&self) -> Result<StatusSnapshot, RpcError>;
    async fn candidates(&self) -> Result<Vec<CandidateView>, RpcError>;
}

/// Row shape the contract returns from `getAllVotesOfCandidates`.
#[derive(Debug, Deserialize)]
struct CandidateRow {
    name: String,
    #[serde(rename = "voteCount")]
    vote_count: u64,
}

/// Signer-bound façade over the voting contract at one address.
///
/// Calls are issued through the session's provider handle; responses are
/// deserialized into view types, and write failures are classified into
/// the fixed [`VoteError`] taxonomy.
#[derive(Clone)]
pub struct ContractGateway {
    provider: Arc<dyn EthereumProvider>,
    contract: EthAddress,
}

impl ContractGateway {
    pub fn new(provider: Arc<dyn EthereumProvider>, contract: EthAddress) -> Self {
        Self { provider, contract }
    }

    pub fn contract(&self) -> &EthAddress {
        &self.contract
    }

    async fn call(&self, method: &str, args: Value) -> Result<Value, ProviderError> {
        self.provider
            .request(method, json!({ "to": self.contract.as_str(), "args": args }))
            .await
    }

    /// Ordered candidate list with live tallies.
    pub async fn candidates(&self) -> Result<Vec<CandidateView>, RpcError> {
        let value = self.call("getAllVotesOfCandidates", json!([])).await?;
        let rows: Vec<CandidateRow> = serde_json::from_value(value)
            .map_err(|e| RpcError::InvalidResponse(format!("candidate list: {e}")))?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| CandidateView {
                index: index as u32,
                name: row.name,
                vote_count: row.vote_count,
            })
            .collect())
    }

    /// Whether voting is currently open.
    pub async fn voting_open(&self) -> Result<bool, RpcError> {
        let value = self.call("getVotingStatus", json!([])).await?;
        value
            .as_bool()
            .ok_or_else(|| RpcError::InvalidResponse(format!("voting status: {value}")))
    }

    /// Seconds until the voting window closes (0 once closed).
    pub async fn remaining_seconds(&self) -> Result<u64, RpcError> {
        let value = self.call("getRemainingTime", json!([])).await?;
        parse_u64(&value)
            .ok_or_else(|| RpcError::InvalidResponse(format!("remaining time: {value}")))
    }

    /// Submit a vote for the candidate at `index`. Failures are
    /// classified best-effort; unmatched revert text degrades to
    /// [`VoteError::Unknown`].
    pub async fn cast_vote(&self, index: u32) -> Result<PendingVote, VoteError> {
        let value = self
            .call("vote", json!([index]))
            .await
            .map_err(VoteError::classify)?;
        let tx_hash = value
            .as_str()
            .map(str::to_owned)
            .unwrap_or_default();
        tracing::info!(candidate = index, tx = %tx_hash, "vote submitted");
        Ok(PendingVote { tx_hash })
    }

    /// Wait for a submitted vote to be included in a block.
    pub async fn await_confirmation(&self, pending: &PendingVote) -> Result<(), VoteError> {
        self.provider
            .request("waitForTransaction", json!({ "hash": pending.tx_hash }))
            .await
            .map_err(VoteError::classify)?;
        tracing::info!(tx = %pending.tx_hash, "vote confirmed");
        Ok(())
    }

    /// Whether any contract code is deployed at `address`, used to sanity
    /// check an election address before switching to it.
    pub async fn has_code(&self, address: &EthAddress) -> Result<bool, RpcError> {
        let value = self
            .provider
            .request("eth_getCode", json!([address.as_str(), "latest"]))
            .await?;
        let code = value
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse(format!("code response: {value}")))?;
        Ok(code != "0x")
    }
}

#[async_trait]
impl ElectionReader for ContractGateway {
    async fn status(&self) -> Result<StatusSnapshot, RpcError> {
        let open = self.voting_open().await?;
        let remaining_seconds = self.remaining_seconds().await?;
        Ok(StatusSnapshot {
            open,
            remaining_seconds,
        })
    }

    async fn candidates(&self) -> Result<Vec<CandidateView>, RpcError> {
        ContractGateway::candidates(self).await
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        // Large uint256 values arrive as decimal strings.
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::provider::ProviderFlags;

    fn contract() -> EthAddress {
        EthAddress::parse("0x61F1d0760aeABB09BFdCF2594ed515725589e73e").unwrap()
    }

    fn gateway(
        script: impl Fn(&str, &Value) -> Result<Value, ProviderError> + Send + Sync + 'static,
    ) -> (Arc<MockProvider>, ContractGateway) {
        let provider = Arc::new(MockProvider::new(ProviderFlags::default(), script));
        let gw = ContractGateway::new(provider.clone(), contract());
        (provider, gw)
    }

    #[tokio::test]
    async fn candidates_are_indexed_in_order() {
        let (_, gw) = gateway(|method, _| match method {
            "getAllVotesOfCandidates" => Ok(json!([
                { "name": "Alice", "voteCount": 3 },
                { "name": "Bob", "voteCount": 0 },
            ])),
            _ => Err(ProviderError::new("unexpected")),
        });

        let candidates = gw.candidates().await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].index, 0);
        assert_eq!(candidates[0].name, "Alice");
        assert_eq!(candidates[0].vote_count, 3);
        assert_eq!(candidates[1].index, 1);
    }

    #[tokio::test]
    async fn status_combines_open_flag_and_remaining_time() {
        let (_, gw) = gateway(|method, _| match method {
            "getVotingStatus" => Ok(json!(true)),
            "getRemainingTime" => Ok(json!("94")),
            _ => Err(ProviderError::new("unexpected")),
        });

        let snapshot = gw.status().await.unwrap();
        assert_eq!(
            snapshot,
            StatusSnapshot {
                open: true,
                remaining_seconds: 94
            }
        );
    }

    #[tokio::test]
    async fn cast_vote_targets_the_bound_contract() {
        let (provider, gw) = gateway(|method, _| match method {
            "vote" => Ok(json!("0xabc123")),
            _ => Err(ProviderError::new("unexpected")),
        });

        let pending = gw.cast_vote(0).await.unwrap();
        assert_eq!(pending.tx_hash, "0xabc123");

        let requests = provider.requests();
        assert_eq!(requests[0].0, "vote");
        assert_eq!(
            requests[0].1["to"],
            json!("0x61F1d0760aeABB09BFdCF2594ed515725589e73e")
        );
        assert_eq!(requests[0].1["args"], json!([0]));
    }

    #[tokio::test]
    async fn cast_vote_classifies_reverts() {
        let (_, gw) = gateway(|method, _| match method {
            "vote" => Err(ProviderError::new(
                "execution reverted: You have already voted.",
            )),
            _ => Err(ProviderError::new("unexpected")),
        });

        assert!(matches!(
            gw.cast_vote(1).await,
            Err(VoteError::AlreadyVoted)
        ));
    }

    #[tokio::test]
    async fn has_code_distinguishes_contracts_from_eoas() {
        let (_, gw) = gateway(|method, params| match method {
            "eth_getCode" => {
                let addr = params[0].as_str().unwrap_or_default();
                if addr.ends_with("e73e") {
                    Ok(json!("0x6080604052"))
                } else {
                    Ok(json!("0x"))
                }
            }
            _ => Err(ProviderError::new("unexpected")),
        });

        assert!(gw.has_code(&contract()).await.unwrap());
        let eoa = EthAddress::parse("0x0000000000000000000000000000000000000001").unwrap();
        assert!(!gw.has_code(&eoa).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_candidate_payload_is_invalid_response() {
        let (_, gw) = gateway(|method, _| match method {
            "getAllVotesOfCandidates" => Ok(json!({ "not": "a list" })),
            _ => Err(ProviderError::new("unexpected")),
        });

        assert!(matches!(
            gw.candidates().await,
            Err(RpcError::InvalidResponse(_))
        ));
    }
}
