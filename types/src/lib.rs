//! Fundamental types for the VotEth voting client.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: Ethereum addresses, wallet sessions, capability tokens,
//! election records, candidate views, and clock helpers.

pub mod address;
pub mod election;
pub mod session;
pub mod time;
pub mod token;

pub use address::{AddressError, EthAddress};
pub use election::{CandidateView, ElectionRecord, PollKind};
pub use session::{WalletKind, WalletSession};
pub use time::unix_now_ms;
pub use token::CapabilityToken;
