//! Periodic refresh of election state.
//!
//! Two independent poll loops (status and results) push snapshots to the
//! presentation layer over a channel. The scheduler reacts to page
//! visibility so a backgrounded client stops hitting the ledger for
//! state nobody is looking at.

pub mod scheduler;

pub use scheduler::{SyncScheduler, SyncUpdate, ViewShape, POLL_PERIOD};
