//! Provider listing fetcher
//!
//! Posts to the listing endpoint with an existing session and hands the
//! returned `<option>` fragment to the parser.

use crate::config::PortalConfig;
use crate::portal::parser::parse_providers;
use crate::portal::session::SessionToken;
use crate::storage::RemoteProviderRecord;
use crate::FetchError;
use reqwest::header::COOKIE;
use reqwest::{Client, StatusCode};

/// Fetches the provider listing with a given session
pub struct ProviderFetcher {
    client: Client,
    providers_url: String,
    username: String,
}

impl ProviderFetcher {
    pub fn new(client: Client, portal: &PortalConfig, username: impl Into<String>) -> Self {
        Self {
            client,
            providers_url: portal.providers_url(),
            username: username.into(),
        }
    }

    /// Fetches and parses the provider listing
    ///
    /// `anchor_id` is any building id the portal accepts; the listing does not
    /// depend on which one is used.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RemoteProviderRecord>)` - Parsed providers, possibly empty
    /// * `Err(FetchError::SessionExpired)` - The portal answered with its login page
    /// * `Err(FetchError::UnexpectedStatus)` - Any status other than 200
    /// * `Err(FetchError::Transport)` - The request could not be completed
    pub async fn fetch(
        &self,
        session: &SessionToken,
        anchor_id: &str,
    ) -> Result<Vec<RemoteProviderRecord>, FetchError> {
        let form = [
            ("selbId", anchor_id),
            ("user", self.username.as_str()),
            ("valuecuit", "0"),
        ];

        let response = self
            .client
            .post(&self.providers_url)
            .header(COOKIE, session.cookie_header())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("Provider listing returned HTTP {}", status.as_u16());
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;

        if is_login_page(&body) {
            tracing::warn!("Provider listing returned a full HTML page; session expired");
            return Err(FetchError::SessionExpired);
        }

        let providers = parse_providers(&body);
        if providers.is_empty() && !body.trim().is_empty() {
            tracing::warn!(
                "Provider listing body ({} bytes) contained no parseable options",
                body.len()
            );
        } else {
            tracing::info!("Fetched {} providers from Redconar", providers.len());
        }

        Ok(providers)
    }
}

/// The listing is a bare `<option>` fragment; a full document means the
/// portal bounced the request to its login page.
pub fn is_login_page(body: &str) -> bool {
    let head: String = body
        .trim_start()
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_lowercase();

    head.starts_with("<!doctype") || head.starts_with("<html")
}
