//! Lookup helpers over a fetched listing
//!
//! Used for reporting and manual inspection. Reconciliation itself matches by
//! CUIT only and never calls [`find_by_name`].

use crate::reconcile::tax_id::{normalize_tax_id, tax_id_key};
use crate::storage::RemoteProviderRecord;
use std::collections::BTreeSet;

/// Providers whose CUIT equals `tax_id` once both are normalized
pub fn filter_by_tax_id<'a>(
    providers: &'a [RemoteProviderRecord],
    tax_id: &str,
) -> Vec<&'a RemoteProviderRecord> {
    let Some(wanted) = tax_id_key(Some(tax_id)) else {
        return Vec::new();
    };

    providers
        .iter()
        .filter(|p| tax_id_key(p.tax_id.as_deref()).as_deref() == Some(wanted.as_str()))
        .collect()
}

/// First provider whose display or legal name contains `name`, ignoring case
pub fn find_by_name<'a>(
    providers: &'a [RemoteProviderRecord],
    name: &str,
) -> Option<&'a RemoteProviderRecord> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    providers.iter().find(|p| {
        p.display_name.to_lowercase().contains(&needle)
            || p.legal_name.to_lowercase().contains(&needle)
    })
}

/// Sorted, deduplicated CUITs as the portal formats them
pub fn unique_tax_ids(providers: &[RemoteProviderRecord]) -> Vec<String> {
    providers
        .iter()
        .filter_map(|p| p.tax_id.clone())
        .filter(|t| !normalize_tax_id(t).is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
