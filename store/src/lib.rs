//! Local persistence for the VotEth client.
//!
//! The browser origin of this client kept everything in `localStorage`;
//! here the same concern is split into a small key-value trait with
//! in-memory and file-backed implementations, and typed stores layered on
//! top of it. The rest of the workspace depends only on the trait.
//!
//! All state is single-context, last-writer-wins, with no transactional
//! semantics (the client is cooperative and single-threaded in effect).

pub mod elections;
pub mod error;
pub mod kv;
pub mod prefs;
pub mod token;

pub use elections::ElectionHistory;
pub use error::StoreError;
pub use kv::{FileStore, KvStore, MemoryStore};
pub use prefs::{Preferences, Theme};
pub use token::TokenStore;
