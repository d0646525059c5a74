//! Catalog client for the record marketplace REST API.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::header::{self, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::{CatalogClientError, RemoteApiError};
use crate::mock::MockClient;
use crate::types::*;

/// Query parameters in insertion order.
///
/// Parameters without a value are omitted from the query string.
pub type QueryParams<'a> = [(&'a str, Option<String>)];

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// A client for the catalog service.
///
/// Holds no per-request state, so a single instance can be shared by every
/// consumer in the process.
/// Consumers receive it by reference rather than through a global.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .field("username", &self.config.username)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let base_url = parse_base_url(&config.catalog_url)?;
        let http = build_http_client(&config)?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Resolve an explicit username or fall back to the configured identity.
    fn username<'a>(&'a self, username: Option<&'a str>) -> Result<&'a str, CatalogClientError> {
        username
            .or(self.config.username.as_deref())
            .ok_or(CatalogClientError::MissingUsername)
    }

    /// Issue a single GET and decode the JSON response.
    ///
    /// No retries: transport failures, error statuses and undecodable bodies
    /// are all returned to the caller as they are.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogClientError> {
        debug!(%url, "sending catalog request");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(CatalogClientError::Transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(CatalogClientError::Transport)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), %body, "catalog API returned an error");
            return Err(CatalogClientError::RemoteApi(RemoteApiError::new(
                status, body,
            )));
        }

        serde_json::from_str(&body).map_err(|source| CatalogClientError::Decoding {
            endpoint: url.path().to_string(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The complete catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog API via [`CatalogClient`]
/// - **Mock**: Canned responses without HTTP via [`MockClient`]
///
/// Operations taking a `username` fall back to the configured default
/// identity when given `None`.
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Get one page of the releases in a collection folder.
    ///
    /// [FolderId::ALL] lists the whole collection.
    async fn get_collection(
        &self,
        username: Option<&str>,
        folder_id: FolderId,
        page: PageRequest,
    ) -> Result<CollectionResponse, CatalogClientError>;

    /// Get the folders of a collection.
    async fn get_collection_folders(
        &self,
        username: Option<&str>,
    ) -> Result<CollectionFoldersResponse, CatalogClientError>;

    /// Get one page of a wantlist.
    async fn get_wantlist(
        &self,
        username: Option<&str>,
        page: PageRequest,
    ) -> Result<WantlistResponse, CatalogClientError>;

    /// Get the details of a single release.
    async fn get_release(&self, release_id: ReleaseId)
    -> Result<ReleaseDetails, CatalogClientError>;

    /// Search the release database.
    async fn search_releases(
        &self,
        query: &str,
        search_type: SearchType,
        page: PageRequest,
    ) -> Result<SearchResponse, CatalogClientError>;
}

impl ClientTrait for CatalogClient {
    #[instrument(skip(self))]
    async fn get_collection(
        &self,
        username: Option<&str>,
        folder_id: FolderId,
        page: PageRequest,
    ) -> Result<CollectionResponse, CatalogClientError> {
        let username = self.username(username)?;
        let url = collection_url(&self.base_url, username, folder_id, page)?;
        let response: CollectionResponse = self.get_json(url).await?;
        debug!(
            n_releases = response.releases.len(),
            page = response.pagination.page,
            pages = response.pagination.pages,
            "received collection page"
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_collection_folders(
        &self,
        username: Option<&str>,
    ) -> Result<CollectionFoldersResponse, CatalogClientError> {
        let username = self.username(username)?;
        let url = folders_url(&self.base_url, username)?;
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn get_wantlist(
        &self,
        username: Option<&str>,
        page: PageRequest,
    ) -> Result<WantlistResponse, CatalogClientError> {
        let username = self.username(username)?;
        let url = wantlist_url(&self.base_url, username, page)?;
        let response: WantlistResponse = self.get_json(url).await?;
        debug!(
            n_wants = response.wants.len(),
            page = response.pagination.page,
            pages = response.pagination.pages,
            "received wantlist page"
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_release(
        &self,
        release_id: ReleaseId,
    ) -> Result<ReleaseDetails, CatalogClientError> {
        let url = build_url(&self.base_url, &["releases", &release_id.to_string()], &[])?;
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn search_releases(
        &self,
        query: &str,
        search_type: SearchType,
        page: PageRequest,
    ) -> Result<SearchResponse, CatalogClientError> {
        let url = search_url(&self.base_url, query, search_type, page)?;
        self.get_json(url).await
    }
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

fn parse_base_url(catalog_url: &str) -> Result<Url, CatalogClientError> {
    let url = Url::parse(catalog_url).map_err(|source| CatalogClientError::InvalidUrl {
        url: catalog_url.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(CatalogClientError::InvalidUrl {
            url: catalog_url.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    Ok(url)
}

/// Append path segments and query parameters to `base`.
///
/// Segments are percent-encoded individually, so a username can never
/// introduce extra path components.
pub fn build_url(
    base: &Url,
    segments: &[&str],
    params: &QueryParams<'_>,
) -> Result<Url, CatalogClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| CatalogClientError::InvalidUrl {
            url: base.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        })?
        .pop_if_empty()
        .extend(segments);

    let mut present = params
        .iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (*key, value)))
        .peekable();
    if present.peek().is_some() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in present {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

fn page_params(page: PageRequest) -> [(&'static str, Option<String>); 2] {
    [
        ("page", Some(page.page.to_string())),
        ("per_page", Some(page.per_page.to_string())),
    ]
}

/// `/users/{username}/collection/folders/{folder_id}/releases?page=&per_page=`
///
/// The "all" folder is addressed by its id `0` in the same position, which is
/// the endpoint variant listing every release regardless of folder.
pub fn collection_url(
    base: &Url,
    username: &str,
    folder_id: FolderId,
    page: PageRequest,
) -> Result<Url, CatalogClientError> {
    build_url(
        base,
        &[
            "users",
            username,
            "collection",
            "folders",
            &folder_id.to_string(),
            "releases",
        ],
        &page_params(page),
    )
}

/// `/users/{username}/collection/folders`
pub fn folders_url(base: &Url, username: &str) -> Result<Url, CatalogClientError> {
    build_url(base, &["users", username, "collection", "folders"], &[])
}

/// `/users/{username}/wants?page=&per_page=`
pub fn wantlist_url(
    base: &Url,
    username: &str,
    page: PageRequest,
) -> Result<Url, CatalogClientError> {
    build_url(base, &["users", username, "wants"], &page_params(page))
}

/// `/database/search?q=&type=&page=&per_page=`
pub fn search_url(
    base: &Url,
    query: &str,
    search_type: SearchType,
    page: PageRequest,
) -> Result<Url, CatalogClientError> {
    let [page_param, per_page_param] = page_params(page);
    build_url(base, &["database", "search"], &[
        ("q", Some(query.to_string())),
        ("type", Some(search_type.to_string())),
        page_param,
        per_page_param,
    ])
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build HTTP client with token auth for the catalog API.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&config.authorization())
            .map_err(|e| CatalogClientError::InvalidHeader(e.to_string()))?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| {
                    CatalogClientError::InvalidHeader(e.to_string())
                },
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| {
                    CatalogClientError::InvalidHeader(e.to_string())
                },
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        user_agent = %config.user_agent,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(&config.user_agent)
        .build()
        .map_err(CatalogClientError::Transport)
}
