use std::path::PathBuf;

use anyhow::{Result, bail};
use heap_rust_sdk::providers::catalog::{
    CatalogClient,
    CatalogClientConfig,
    Client,
    HEAP_CATALOG_MOCK_DATA_VAR,
    MockClient,
};
use indoc::indoc;
use tracing::debug;

use crate::config::Config;

/// Initialize the catalog API client
///
/// - Initialize a mock client if the `_HEAP_USE_CATALOG_MOCK` environment variable
///   points to a file of mock responses
/// - Initialize a real client otherwise, which requires a token
///
/// The client is created once per invocation and passed to every command.
pub fn init_catalog_client(config: &Config) -> Result<Client> {
    if let Ok(path_str) = std::env::var(HEAP_CATALOG_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(mock_data_path = %path.display(), "using mock catalog client");
        return Ok(MockClient::new(Some(path))?.into());
    }

    let client_config = catalog_client_config(config)?;
    debug!(catalog_url = %client_config.catalog_url, "using catalog client");
    Ok(CatalogClient::new(client_config)?.into())
}

fn catalog_client_config(config: &Config) -> Result<CatalogClientConfig> {
    let Some(token) = config.heap.token.clone() else {
        bail!(indoc! {"
            No catalog API token configured.

            Set 'HEAP_TOKEN' in the environment or 'token' in heap.toml."
        });
    };

    let mut client_config = CatalogClientConfig::new(token);
    if let Some(base_url) = &config.heap.base_url {
        client_config.catalog_url = base_url.clone();
    }
    if let Some(user_agent) = &config.heap.user_agent {
        client_config.user_agent = user_agent.clone();
    }
    client_config.username = config.heap.username.clone();
    client_config.extra_headers = config.heap.extra_headers.clone();

    Ok(client_config)
}
