//! A catalog client that answers from a queue of canned responses.
//!
//! Used by tests and, via `_HEAP_USE_CATALOG_MOCK`, by the CLI to run
//! without network access.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientTrait;
use crate::error::{CatalogClientError, RemoteApiError};
use crate::types::*;

pub const HEAP_CATALOG_MOCK_DATA_VAR: &str = "_HEAP_USE_CATALOG_MOCK";

// Shared between clones so tests can queue responses after handing out the client
type MockField<T> = Arc<Mutex<T>>;

/// An error response as it would be returned by the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    #[serde(default)]
    pub body: String,
}

impl From<ErrorResponse> for CatalogClientError {
    fn from(value: ErrorResponse) -> Self {
        // Status codes are validated when responses are read or pushed.
        let status =
            StatusCode::from_u16(value.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        CatalogClientError::RemoteApi(RemoteApiError::new(status, value.body))
    }
}

/// A canned response.
///
/// Variants are tried in order when reading mock data files,
/// so shapes with more required fields come first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Collection(CollectionResponse),
    Wantlist(WantlistResponse),
    Folders(CollectionFoldersResponse),
    Search(SearchResponse),
    Error(ErrorResponse),
    Release(ReleaseDetails),
}

/// A request as observed by the [MockClient].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    Collection {
        username: Option<String>,
        folder_id: FolderId,
        page: PageRequest,
    },
    Folders {
        username: Option<String>,
    },
    Wantlist {
        username: Option<String>,
        page: PageRequest,
    },
    Release(ReleaseId),
    Search {
        query: String,
        search_type: SearchType,
        page: PageRequest,
    },
}

#[derive(Debug, Error)]
pub enum MockDataError {
    /// Failed to read the JSON file pointed at by the _HEAP_USE_CATALOG_MOCK var
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    /// Failed to parse the contents of the mock data file as JSON
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
    /// The data was parsed as JSON but it wasn't semantically valid
    #[error("invalid mocked data: {0}")]
    InvalidData(String),
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<Response>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let deserialized: Vec<Response> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;

    for response in &deserialized {
        if let Response::Error(err) = response {
            StatusCode::from_u16(err.status).map_err(|_| {
                MockDataError::InvalidData(format!("invalid status code {}", err.status))
            })?;
        }
    }

    Ok(deserialized.into())
}

/// A catalog client that can be seeded with mock responses.
///
/// Each operation pops the next queued response.
/// Popping a response of the wrong kind (or none at all) panics,
/// which makes unexpected requests fail loudly in tests.
#[derive(Debug, Default, Clone)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<Response>>,
    requests: MockField<Vec<MockRequest>>,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let mock_responses = match mock_data_path {
            Some(path) => read_mock_responses(path)?,
            None => VecDeque::new(),
        };
        Ok(Self {
            mock_responses: Arc::new(Mutex::new(mock_responses)),
            requests: Default::default(),
        })
    }

    /// Push a new response into the list of mock responses
    pub fn push_response(&self, resp: Response) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(resp);
    }

    pub fn push_collection_response(&self, resp: CollectionResponse) {
        self.push_response(Response::Collection(resp));
    }

    pub fn push_wantlist_response(&self, resp: WantlistResponse) {
        self.push_response(Response::Wantlist(resp));
    }

    pub fn push_folders_response(&self, resp: CollectionFoldersResponse) {
        self.push_response(Response::Folders(resp));
    }

    pub fn push_release_response(&self, resp: ReleaseDetails) {
        self.push_response(Response::Release(resp));
    }

    pub fn push_search_response(&self, resp: SearchResponse) {
        self.push_response(Response::Search(resp));
    }

    /// Push an API error into the list of mock responses
    pub fn push_error_response(&self, status: StatusCode, body: impl Into<String>) {
        self.push_response(Response::Error(ErrorResponse {
            status: status.as_u16(),
            body: body.into(),
        }));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .clone()
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .len()
    }

    fn next_response(&self, request: MockRequest) -> Option<Response> {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .push(request);
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front()
    }
}

impl ClientTrait for MockClient {
    async fn get_collection(
        &self,
        username: Option<&str>,
        folder_id: FolderId,
        page: PageRequest,
    ) -> Result<CollectionResponse, CatalogClientError> {
        let mock_resp = self.next_response(MockRequest::Collection {
            username: username.map(ToString::to_string),
            folder_id,
            page,
        });
        match mock_resp {
            Some(Response::Collection(resp)) => Ok(resp),
            Some(Response::Error(err)) => Err(err.into()),
            _ => panic!("expected collection response, found {:?}", &mock_resp),
        }
    }

    async fn get_collection_folders(
        &self,
        username: Option<&str>,
    ) -> Result<CollectionFoldersResponse, CatalogClientError> {
        let mock_resp = self.next_response(MockRequest::Folders {
            username: username.map(ToString::to_string),
        });
        match mock_resp {
            Some(Response::Folders(resp)) => Ok(resp),
            Some(Response::Error(err)) => Err(err.into()),
            _ => panic!("expected folders response, found {:?}", &mock_resp),
        }
    }

    async fn get_wantlist(
        &self,
        username: Option<&str>,
        page: PageRequest,
    ) -> Result<WantlistResponse, CatalogClientError> {
        let mock_resp = self.next_response(MockRequest::Wantlist {
            username: username.map(ToString::to_string),
            page,
        });
        match mock_resp {
            Some(Response::Wantlist(resp)) => Ok(resp),
            Some(Response::Error(err)) => Err(err.into()),
            _ => panic!("expected wantlist response, found {:?}", &mock_resp),
        }
    }

    async fn get_release(
        &self,
        release_id: ReleaseId,
    ) -> Result<ReleaseDetails, CatalogClientError> {
        let mock_resp = self.next_response(MockRequest::Release(release_id));
        match mock_resp {
            Some(Response::Release(resp)) => Ok(resp),
            Some(Response::Error(err)) => Err(err.into()),
            _ => panic!("expected release response, found {:?}", &mock_resp),
        }
    }

    async fn search_releases(
        &self,
        query: &str,
        search_type: SearchType,
        page: PageRequest,
    ) -> Result<SearchResponse, CatalogClientError> {
        let mock_resp = self.next_response(MockRequest::Search {
            query: query.to_string(),
            search_type,
            page,
        });
        match mock_resp {
            Some(Response::Search(resp)) => Ok(resp),
            Some(Response::Error(err)) => Err(err.into()),
            _ => panic!("expected search response, found {:?}", &mock_resp),
        }
    }
}
