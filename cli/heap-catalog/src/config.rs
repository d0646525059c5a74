//! Configuration types for catalog client construction.

use std::collections::BTreeMap;

pub const DEFAULT_CATALOG_URL: &str = "https://api.discogs.com";
pub const DEFAULT_AUTH_SCHEME: &str = "Discogs";

/// `User-Agent` sent when none is configured: `<client-id>/<version>`.
pub fn default_user_agent() -> String {
    format!("heap/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API.
    pub catalog_url: String,
    /// Personal access token sent with every request.
    pub token: String,
    /// Scheme of the `Authorization` header, i.e. `<scheme> token=<token>`.
    pub auth_scheme: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Identity used when an operation is called without a username.
    pub username: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
}

impl CatalogClientConfig {
    /// Config for the public catalog with all defaults applied.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            token: token.into(),
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            user_agent: default_user_agent(),
            username: None,
            extra_headers: BTreeMap::new(),
        }
    }

    /// The value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} token={}", self.auth_scheme, self.token)
    }
}
