//! HTTP client construction

use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Builds the HTTP client shared by the session acquirer and the fetcher
///
/// Redirects are never followed: the login answers with a redirect that
/// carries the session cookie, and that first response is the one to read.
///
/// # Example
///
/// ```no_run
/// use redconar_sync::config::HttpConfig;
/// use redconar_sync::portal::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}
