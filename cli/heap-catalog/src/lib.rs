//! HTTP client for the record marketplace catalog API.
//!
//! This crate provides:
//! - HTTP client construction with token authentication
//! - Typed records for collections, folders, wantlists, releases and search
//! - A single error type normalizing transport, HTTP and decoding failures
//! - A mock client answering from canned responses
//!
//! ## Usage
//!
//! ```ignore
//! use heap_catalog::{CatalogClient, CatalogClientConfig, ClientTrait, FolderId, PageRequest};
//!
//! let config = CatalogClientConfig {
//!     username: Some("digger".to_string()),
//!     ..CatalogClientConfig::new(token)
//! };
//!
//! let client = CatalogClient::new(config)?;
//! let page = client.get_collection(None, FolderId::ALL, PageRequest::default()).await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod types;

pub use client::{
    CatalogClient,
    Client,
    ClientTrait,
    build_url,
    collection_url,
    folders_url,
    search_url,
    wantlist_url,
};
pub use config::{
    CatalogClientConfig,
    DEFAULT_AUTH_SCHEME,
    DEFAULT_CATALOG_URL,
    default_user_agent,
};
pub use error::{CatalogClientError, RemoteApiError};
pub use mock::{
    ErrorResponse,
    HEAP_CATALOG_MOCK_DATA_VAR,
    MockClient,
    MockDataError,
    MockRequest,
    Response,
};
pub use types::*;
