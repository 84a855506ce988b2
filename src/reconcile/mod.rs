//! Reconciliation of local providers against the Redconar listing
//!
//! Providers are matched by CUIT only. Each run classifies the two sets into
//! four disjoint buckets:
//!
//! | Bucket | Condition |
//! |--------|-----------|
//! | `to_link` | local has a CUIT, no Redconar id, and the CUIT is listed remotely |
//! | `to_update` | local already has a Redconar id that differs from the listed one |
//! | `new_in_remote` | remote CUIT unknown locally |
//! | `missing_in_remote` | local CUIT not listed remotely |
//!
//! Only `to_link` is ever applied. Records without a CUIT only count in the
//! stats; name similarity is never used to match.

mod search;
mod tax_id;

pub use search::{filter_by_tax_id, find_by_name, unique_tax_ids};
pub use tax_id::{normalize_tax_id, tax_id_key};

use crate::storage::{LocalProviderRecord, RemoteProviderRecord};
use std::collections::HashMap;

/// A local provider paired with the remote provider sharing its CUIT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub local: LocalProviderRecord,
    pub remote: RemoteProviderRecord,
}

/// Counts over both inputs, including records without a CUIT
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationStats {
    pub remote_total: usize,
    pub remote_with_tax_id: usize,
    pub local_total: usize,
    pub local_with_tax_id: usize,
    pub local_with_external_id: usize,
}

/// Outcome of comparing the two provider sets
///
/// Computed fresh on every run. Buckets are sorted (local buckets by local id,
/// `new_in_remote` by Redconar id) so the result does not depend on input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub to_link: Vec<LinkCandidate>,
    pub new_in_remote: Vec<RemoteProviderRecord>,
    pub missing_in_remote: Vec<LocalProviderRecord>,
    pub to_update: Vec<LinkCandidate>,
    pub stats: ReconciliationStats,
}

/// Compares local providers with the remote listing
///
/// When the listing repeats a CUIT under two Redconar ids the last one wins.
///
/// # Example
///
/// ```
/// use redconar_sync::reconcile::reconcile;
/// use redconar_sync::storage::{LocalProviderRecord, RemoteProviderRecord};
///
/// let local = vec![LocalProviderRecord {
///     id: "a".into(),
///     tax_id: Some("30-71568977-0".into()),
///     display_name: "ACME".into(),
///     fantasy_name: None,
///     email: None,
///     external_id: None,
/// }];
/// let remote = vec![RemoteProviderRecord {
///     external_id: "1".into(),
///     display_name: "ACME".into(),
///     legal_name: "Acme SA".into(),
///     tax_id: Some("30715689770".into()),
/// }];
///
/// let result = reconcile(&local, &remote);
/// assert_eq!(result.to_link.len(), 1);
/// ```
pub fn reconcile(
    local: &[LocalProviderRecord],
    remote: &[RemoteProviderRecord],
) -> ReconciliationResult {
    let remote_by_tax_id = index_by_tax_id(remote, |r| r.tax_id.as_deref(), "remote");
    let local_by_tax_id = index_by_tax_id(local, |l| l.tax_id.as_deref(), "local");

    let mut to_link = Vec::new();
    let mut to_update = Vec::new();
    let mut missing_in_remote = Vec::new();

    for record in local {
        let Some(key) = tax_id_key(record.tax_id.as_deref()) else {
            continue;
        };

        match (remote_by_tax_id.get(&key), &record.external_id) {
            (None, _) => missing_in_remote.push(record.clone()),
            (Some(remote), None) => to_link.push(LinkCandidate {
                local: record.clone(),
                remote: (*remote).clone(),
            }),
            (Some(remote), Some(external_id)) if *external_id != remote.external_id => {
                to_update.push(LinkCandidate {
                    local: record.clone(),
                    remote: (*remote).clone(),
                })
            }
            (Some(_), Some(_)) => {}
        }
    }

    let mut new_in_remote: Vec<RemoteProviderRecord> = remote
        .iter()
        .filter(|r| {
            tax_id_key(r.tax_id.as_deref())
                .map(|key| !local_by_tax_id.contains_key(&key))
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    to_link.sort_by(|a, b| a.local.id.cmp(&b.local.id));
    to_update.sort_by(|a, b| a.local.id.cmp(&b.local.id));
    missing_in_remote.sort_by(|a, b| a.id.cmp(&b.id));
    new_in_remote.sort_by(|a, b| {
        (&a.external_id, &a.tax_id, &a.display_name, &a.legal_name).cmp(&(
            &b.external_id,
            &b.tax_id,
            &b.display_name,
            &b.legal_name,
        ))
    });

    let stats = ReconciliationStats {
        remote_total: remote.len(),
        remote_with_tax_id: remote.iter().filter(|r| r.tax_id.is_some()).count(),
        local_total: local.len(),
        local_with_tax_id: local.iter().filter(|l| l.tax_id.is_some()).count(),
        local_with_external_id: local.iter().filter(|l| l.external_id.is_some()).count(),
    };

    tracing::debug!(
        "Reconciled {} local / {} remote: {} to link, {} to update, {} new, {} missing",
        stats.local_total,
        stats.remote_total,
        to_link.len(),
        to_update.len(),
        new_in_remote.len(),
        missing_in_remote.len()
    );

    ReconciliationResult {
        to_link,
        new_in_remote,
        missing_in_remote,
        to_update,
        stats,
    }
}

/// Normalized CUIT -> record; later records overwrite earlier ones
fn index_by_tax_id<'a, T>(
    records: &'a [T],
    tax_id: impl Fn(&T) -> Option<&str>,
    side: &str,
) -> HashMap<String, &'a T> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(key) = tax_id_key(tax_id(record)) {
            if index.insert(key.clone(), record).is_some() {
                tracing::debug!("Duplicate {} CUIT {}; keeping the last record", side, key);
            }
        }
    }
    index
}
