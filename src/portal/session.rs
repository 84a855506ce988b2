//! Session acquisition through the portal's form login
//!
//! The portal answers a successful login with a redirect whose `Set-Cookie`
//! carries the `PHPSESSID`. The request is sent once with redirects disabled
//! and the cookie is read off that first response.

use crate::config::{Credentials, PortalConfig};
use crate::AcquisitionError;
use reqwest::header::{HeaderMap, LOCATION, SET_COOKIE};
use reqwest::Client;
use std::fmt;

/// Name of the portal's session cookie
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// An opaque portal session id
///
/// Its lifetime is controlled by the portal; nothing here persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Cookie` request header
    pub fn cookie_header(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.0)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logs into the portal and captures the session cookie
pub struct SessionAcquirer {
    client: Client,
    login_url: String,
    home_redirect: String,
    credentials: Credentials,
}

impl SessionAcquirer {
    /// Creates an acquirer for the login endpoint of `portal`
    ///
    /// The client must not follow redirects (see [`super::build_http_client`]).
    pub fn new(client: Client, portal: &PortalConfig, credentials: Credentials) -> Self {
        Self {
            client,
            login_url: portal.login_url(),
            home_redirect: portal.home_redirect.clone(),
            credentials,
        }
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Performs one login attempt
    ///
    /// # Returns
    ///
    /// * `Ok(SessionToken)` - The `PHPSESSID` handed out by the portal
    /// * `Err(AcquisitionError::NoRedirectCookie)` - Redirected without a cookie
    /// * `Err(AcquisitionError::NoCookieAtAll)` - Any other response without a cookie
    /// * `Err(AcquisitionError::Transport)` - The request could not be completed
    pub async fn acquire(&self) -> Result<SessionToken, AcquisitionError> {
        let form = [
            ("usuario", self.credentials.username.as_str()),
            ("contrasena", self.credentials.password.as_str()),
            ("home_", self.home_redirect.as_str()),
        ];

        tracing::debug!("Logging into {} as {}", self.login_url, self.credentials.username);

        let response = self.client.post(&self.login_url).form(&form).send().await?;
        let status = response.status();
        let headers = response.headers();

        if let Some(token) = extract_session_cookie(headers) {
            tracing::info!("Portal session acquired (HTTP {})", status.as_u16());
            return Ok(token);
        }

        if status.is_redirection() {
            if let Some(location) = headers.get(LOCATION) {
                let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
                tracing::warn!("Login redirected to {} without a session cookie", location);
                return Err(AcquisitionError::NoRedirectCookie {
                    status: status.as_u16(),
                    location,
                });
            }
        }

        tracing::warn!("Login returned HTTP {} without a session cookie", status.as_u16());
        Err(AcquisitionError::NoCookieAtAll {
            status: status.as_u16(),
        })
    }
}

/// Finds the session cookie among every `Set-Cookie` header
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| cookie_value(cookie, SESSION_COOKIE))
        .map(SessionToken::new)
}

/// Value of `name=` up to the next `;`, or `None` when missing or empty
fn cookie_value(set_cookie: &str, name: &str) -> Option<String> {
    let key = format!("{}=", name);
    let start = set_cookie.find(&key)? + key.len();
    let value = set_cookie[start..].split(';').next()?.trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
