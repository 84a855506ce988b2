//! Redconar portal access
//!
//! This module isolates everything that depends on the portal's undocumented
//! contract:
//! - HTTP client construction (no redirect following)
//! - Form login and `PHPSESSID` capture
//! - Provider listing retrieval
//! - Parsing of the `<option>` listing fragment

mod client;
mod fetcher;
mod parser;
mod session;

pub use client::build_http_client;
pub use fetcher::{is_login_page, ProviderFetcher};
pub use parser::{format_option_text, parse_providers, PLACEHOLDER_TEXT};
pub use session::{extract_session_cookie, SessionAcquirer, SessionToken, SESSION_COOKIE};
