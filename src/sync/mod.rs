//! Sync pipeline
//!
//! This module contains the orchestration of a reconciliation run and the
//! batch linker that applies its result.

mod coordinator;
mod linker;

pub use coordinator::{acquire_session, run_sync, SyncOptions, SyncOutcome};
pub use linker::{apply_links, LinkError, LinkOutcome};
