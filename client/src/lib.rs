//! Orchestration layer of the VotEth voting client.
//!
//! Ties the workspace together: deployment configuration, the vote
//! submission flow, and the [`ClientContext`] that owns the wallet
//! session, the current election binding, the poll scheduler and the
//! verification manager for one page.

pub mod config;
pub mod context;
pub mod flow;
pub mod logging;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{load_config, AppConfig, DEFAULT_CONTRACT_ADDRESS};
pub use context::{ClientChannels, ClientContext, SwitchError};
pub use flow::{VotePhase, VoteRejection, VoteSubmissionFlow};
pub use logging::init_tracing;
