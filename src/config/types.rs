use serde::Deserialize;
use std::fmt;

/// Main configuration structure for Redconar-Sync
///
/// Every table is optional; a missing file section falls back to the
/// production portal endpoints and a local `proveedores.db`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Redconar portal endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Scheme and host of the portal, without a trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the form-login endpoint
    #[serde(rename = "login-path")]
    pub login_path: String,

    /// Path of the provider-listing endpoint
    #[serde(rename = "providers-path")]
    pub providers_path: String,

    /// Value sent as the `home_` login parameter
    #[serde(rename = "home-redirect")]
    pub home_redirect: String,

    /// Building id sent as `selbId`. Any valid building returns the full listing.
    #[serde(rename = "anchor-id")]
    pub anchor_id: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.redconar.net".to_string(),
            login_path: "/userValidator.php".to_string(),
            providers_path: "/ajax/proveedores/ajaxScriptProviders.php".to_string(),
            home_redirect: "https://www.redconar.net/login/ingresar.php?".to_string(),
            anchor_id: "16528".to_string(),
        }
    }
}

impl PortalConfig {
    /// Builds a portal config pointing at another host, keeping the default paths
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn login_url(&self) -> String {
        join_url(&self.base_url, &self.login_path)
    }

    pub fn providers_url(&self) -> String {
        join_url(&self.base_url, &self.providers_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("redconar-sync/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Local provider store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./proveedores.db".to_string(),
        }
    }
}

/// Portal login credentials
///
/// Read once by the binary and handed to the components that need them.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
