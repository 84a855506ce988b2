//! Batch linker
//!
//! Writes the Redconar ids of every link candidate in a single conditional
//! update. The batch is all-or-nothing: on any store error nothing is linked.

use crate::reconcile::LinkCandidate;
use crate::storage::{ProviderStore, StorageError};
use thiserror::Error;

/// Result of a successful batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    pub linked: usize,
}

/// A failed batch; nothing was linked
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Linking {attempted} providers failed: {source}")]
    Store {
        attempted: usize,
        #[source]
        source: StorageError,
    },
}

impl LinkError {
    /// Number of providers the failed batch tried to link
    pub fn attempted(&self) -> usize {
        match self {
            Self::Store { attempted, .. } => *attempted,
        }
    }
}

/// Applies all pending links in one store operation
///
/// An empty batch returns `linked: 0` without touching the store.
pub fn apply_links<S: ProviderStore + ?Sized>(
    store: &mut S,
    to_link: &[LinkCandidate],
) -> Result<LinkOutcome, LinkError> {
    if to_link.is_empty() {
        return Ok(LinkOutcome { linked: 0 });
    }

    let links: Vec<(String, String)> = to_link
        .iter()
        .map(|c| (c.local.id.clone(), c.remote.external_id.clone()))
        .collect();

    match store.link_external_ids(&links) {
        Ok(linked) => {
            tracing::info!("Linked {} providers to Redconar ids", linked);
            Ok(LinkOutcome { linked })
        }
        Err(source) => {
            tracing::error!("Batch link of {} providers failed: {}", links.len(), source);
            Err(LinkError::Store {
                attempted: links.len(),
                source,
            })
        }
    }
}
