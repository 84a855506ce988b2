//! CUIT normalization
//!
//! The portal and the local table format CUITs differently
//! (`30-71568977-0` vs `30715689770`). Comparison uses digits only; stored
//! values keep their formatting.

/// Strips every non-digit character
///
/// # Example
///
/// ```
/// use redconar_sync::reconcile::normalize_tax_id;
///
/// assert_eq!(normalize_tax_id("30-71568977-0"), "30715689770");
/// ```
pub fn normalize_tax_id(tax_id: &str) -> String {
    tax_id.chars().filter(char::is_ascii_digit).collect()
}

/// Comparison key for an optional CUIT
///
/// `None` when the CUIT is absent or contains no digits at all, which
/// excludes the record from reconciliation.
pub fn tax_id_key(tax_id: Option<&str>) -> Option<String> {
    tax_id.map(normalize_tax_id).filter(|key| !key.is_empty())
}
