//! Parser for the provider `<option>` list
//!
//! The listing endpoint answers with a bare fragment of `<option>` tags, one
//! per provider, whose text packs the names and the CUIT:
//!
//! ```text
//! <option value='1234'>ACME - Acme Corp SRL |  30-12345678-9</option>
//! ```
//!
//! The format is narrow and known, so the fragment is scanned at tag level
//! instead of being built into a DOM.

use crate::storage::RemoteProviderRecord;
use regex::Regex;
use std::sync::OnceLock;

/// Text of the disabled first option of the listing
pub const PLACEHOLDER_TEXT: &str = "Seleccione un proveedor...";

/// Separates the names from the CUIT: space, pipe, two spaces
pub const TAX_ID_SEPARATOR: &str = " |  ";

/// Separates the display name from the legal name
pub const NAME_SEPARATOR: &str = " - ";

/// Shown by the portal when a provider has no CUIT
const ABSENT_TAX_ID: &str = "--";

fn option_regex() -> &'static Regex {
    static OPTION_RE: OnceLock<Regex> = OnceLock::new();
    OPTION_RE.get_or_init(|| {
        Regex::new(r#"<option[^>]*value=['"]([^'"]*)['"][^>]*>([^<]*)</option>"#)
            .expect("option pattern is valid")
    })
}

/// Parses a listing fragment into provider records
///
/// Records come back in document order, without deduplication. Options with
/// an empty value and the placeholder option are skipped. Malformed options
/// (no value, nested markup in the text) simply do not match.
///
/// # Example
///
/// ```
/// use redconar_sync::portal::parse_providers;
///
/// let html = r#"<option value="1">ACME - Acme Corp |  30-12345678-9</option>"#;
/// let providers = parse_providers(html);
/// assert_eq!(providers[0].legal_name, "Acme Corp");
/// ```
pub fn parse_providers(html: &str) -> Vec<RemoteProviderRecord> {
    option_regex()
        .captures_iter(html)
        .filter_map(|caps| {
            let external_id = caps.get(1)?.as_str();
            let text = caps.get(2)?.as_str().trim();

            if external_id.is_empty() || text == PLACEHOLDER_TEXT {
                return None;
            }

            Some(parse_option_text(external_id, text))
        })
        .collect()
}

/// Splits one option text into display name, legal name and CUIT
fn parse_option_text(external_id: &str, text: &str) -> RemoteProviderRecord {
    let Some((name_part, rest)) = text.split_once(TAX_ID_SEPARATOR) else {
        return RemoteProviderRecord {
            external_id: external_id.to_string(),
            display_name: text.to_string(),
            legal_name: text.to_string(),
            tax_id: None,
        };
    };

    // Anything after a second separator is dropped
    let tax_id = rest
        .split(TAX_ID_SEPARATOR)
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != ABSENT_TAX_ID)
        .map(str::to_string);

    let (display_name, legal_name) = match name_part.split_once(NAME_SEPARATOR) {
        Some((display, legal)) => (display.trim(), legal.trim()),
        None => (name_part.trim(), name_part.trim()),
    };

    RemoteProviderRecord {
        external_id: external_id.to_string(),
        display_name: display_name.to_string(),
        legal_name: legal_name.to_string(),
        tax_id,
    }
}

/// Renders a record back into the listing's option text
///
/// Inverse of the text parsing for records that carry a CUIT.
pub fn format_option_text(record: &RemoteProviderRecord) -> String {
    let names = if record.display_name == record.legal_name {
        record.display_name.clone()
    } else {
        format!("{}{}{}", record.display_name, NAME_SEPARATOR, record.legal_name)
    };

    match &record.tax_id {
        Some(tax_id) => format!("{}{}{}", names, TAX_ID_SEPARATOR, tax_id),
        None => names,
    }
}
