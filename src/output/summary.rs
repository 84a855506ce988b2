//! Human-readable comparison report
//!
//! Rendered by `--report`: the counts of both sides followed by each bucket,
//! listing at most ten entries per bucket except `to_update`, which is always
//! listed in full since every entry needs manual attention.

use crate::reconcile::ReconciliationResult;
use std::fmt::Write;

/// Entries shown per bucket before eliding the rest
const PREVIEW_LIMIT: usize = 10;

/// Renders the comparison as plain text
pub fn render_comparison(result: &ReconciliationResult) -> String {
    let mut out = String::new();
    let stats = &result.stats;

    // Writing into a String cannot fail
    let _ = writeln!(out, "STATISTICS:");
    let _ = writeln!(
        out,
        "  Redconar: {} total ({} with CUIT)",
        stats.remote_total, stats.remote_with_tax_id
    );
    let _ = writeln!(
        out,
        "  Local:    {} total ({} with CUIT, {} with Redconar id)",
        stats.local_total, stats.local_with_tax_id, stats.local_with_external_id
    );

    section(
        &mut out,
        "NEW IN REDCONAR",
        "In Redconar but not in the local table:",
        "No new providers in Redconar",
        result.new_in_remote.iter().map(|p| {
            format!(
                "{} ({}) [redconar id: {}]",
                p.display_name,
                p.tax_id.as_deref().unwrap_or("-"),
                p.external_id
            )
        }),
        Some(PREVIEW_LIMIT),
    );

    section(
        &mut out,
        "MISSING IN REDCONAR",
        "In the local table but not in Redconar:",
        "Every local provider is listed in Redconar",
        result.missing_in_remote.iter().map(|p| {
            format!(
                "{} ({})",
                p.display_name,
                p.tax_id.as_deref().unwrap_or("-")
            )
        }),
        Some(PREVIEW_LIMIT),
    );

    section(
        &mut out,
        "TO LINK",
        "CUIT matches Redconar but no Redconar id is stored:",
        "Every provider with a CUIT has a Redconar id",
        result.to_link.iter().map(|c| {
            format!(
                "{} ({}) -> redconar id: {}",
                c.local.display_name,
                c.local.tax_id.as_deref().unwrap_or("-"),
                c.remote.external_id
            )
        }),
        Some(PREVIEW_LIMIT),
    );

    if !result.to_update.is_empty() {
        section(
            &mut out,
            "TO UPDATE",
            "Stored Redconar id differs from the one listed for the CUIT:",
            "",
            result.to_update.iter().map(|c| {
                format!(
                    "{}: {} -> {}",
                    c.local.display_name,
                    c.local.external_id.as_deref().unwrap_or("-"),
                    c.remote.external_id
                )
            }),
            None,
        );
    }

    out
}

fn section(
    out: &mut String,
    title: &str,
    description: &str,
    empty_message: &str,
    entries: impl ExactSizeIterator<Item = String>,
    limit: Option<usize>,
) {
    let total = entries.len();
    let _ = writeln!(out);

    if total == 0 {
        let _ = writeln!(out, "{}", empty_message);
        return;
    }

    let _ = writeln!(out, "{} ({}):", title, total);
    let _ = writeln!(out, "  {}", description);

    let shown = limit.unwrap_or(total);
    for entry in entries.take(shown) {
        let _ = writeln!(out, "  - {}", entry);
    }

    if total > shown {
        let _ = writeln!(out, "  ... and {} more", total - shown);
    }
}
