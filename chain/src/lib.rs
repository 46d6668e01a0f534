//! Wallet connection and ledger access for the VotEth client.
//!
//! Everything chain-facing lives here:
//! - the injected-provider abstraction and ordered wallet discovery,
//! - the [`WalletConnector`] session state machine (connect, network
//!   validation, provider event subscriptions, disconnect),
//! - the [`ContractGateway`] typed read/write façade over the voting
//!   contract, including best-effort classification of revert errors.
//!
//! The provider is modeled as an opaque JSON request surface plus an
//! event-subscription surface; the rest of the workspace depends only on
//! the traits defined here.

/// Chain id of the Sepolia test network, the only network the voting
/// contract is deployed on.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

pub mod connector;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod provider;

pub use connector::{SessionEvent, WalletConnector};
pub use discovery::InjectedWallets;
pub use error::{ConnectError, ProviderError, RpcError, VoteError, USER_REJECTED_CODE};
pub use gateway::{ContractGateway, ElectionReader, PendingVote, StatusSnapshot};
pub use provider::{
    classify_wallet, EthereumProvider, EventHandler, ProviderEvent, ProviderFlags, SubscriptionId,
};
