//! Fixtures and clients shared by the model tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::DateTime;
use tokio::sync::oneshot;

use crate::providers::catalog::{
    ArtistCredit,
    BasicInformation,
    CatalogClientError,
    ClientTrait,
    CollectionFoldersResponse,
    CollectionItem,
    CollectionResponse,
    ErrorResponse,
    Folder,
    FolderId,
    PageRequest,
    Pagination,
    ReleaseDetails,
    ReleaseId,
    Response,
    SearchResponse,
    SearchType,
    WantlistItem,
    WantlistResponse,
};

pub fn basic_information(
    id: u64,
    title: &str,
    artist: Option<&str>,
    year: Option<u32>,
) -> BasicInformation {
    BasicInformation {
        id: Some(ReleaseId(id)),
        title: title.to_string(),
        year,
        artists: artist
            .map(|name| ArtistCredit {
                name: name.to_string(),
                id: None,
            })
            .into_iter()
            .collect(),
        formats: Vec::new(),
        thumb: Some(format!("https://img.example/{id}/thumb.jpg")),
        cover_image: Some(format!("https://img.example/{id}/cover.jpg")),
    }
}

pub fn collection_item(id: u64, title: &str) -> CollectionItem {
    CollectionItem {
        id: ReleaseId(id),
        instance_id: id * 100,
        date_added: DateTime::parse_from_rfc3339("2024-03-01T10:00:00-08:00").unwrap(),
        basic_information: basic_information(id, title, Some("Various"), None),
    }
}

pub fn wantlist_item(
    id: u64,
    title: &str,
    artist: Option<&str>,
    year: Option<u32>,
    date_added: &str,
) -> WantlistItem {
    WantlistItem {
        id: ReleaseId(id),
        date_added: DateTime::parse_from_rfc3339(date_added).unwrap(),
        basic_information: basic_information(id, title, artist, year),
    }
}

pub fn pagination(page: u32, pages: u32, items: u64) -> Pagination {
    Pagination {
        page,
        pages,
        per_page: 2,
        items,
        urls: Default::default(),
    }
}

/// A collection page of `ids`, as page `page` of `pages` with `total` items.
pub fn collection_page(ids: &[u64], page: u32, pages: u32, total: u64) -> CollectionResponse {
    CollectionResponse {
        releases: ids
            .iter()
            .map(|id| collection_item(*id, &format!("Release {id}")))
            .collect(),
        pagination: pagination(page, pages, total),
    }
}

pub fn wantlist_page(
    wants: Vec<WantlistItem>,
    page: u32,
    pages: u32,
    total: u64,
) -> WantlistResponse {
    WantlistResponse {
        wants,
        pagination: pagination(page, pages, total),
    }
}

pub fn folders(entries: &[(u64, &str, u64)]) -> CollectionFoldersResponse {
    CollectionFoldersResponse {
        folders: entries
            .iter()
            .map(|(id, name, count)| Folder {
                id: FolderId(*id),
                name: name.to_string(),
                count: *count,
                resource_url: None,
            })
            .collect(),
    }
}

pub fn error_response(status: u16, body: &str) -> Response {
    Response::Error(ErrorResponse {
        status,
        body: body.to_string(),
    })
}

/// A client whose responses are released by the test, one gate per request.
///
/// Gates are consumed in request order, but may be opened in any order,
/// which lets tests resolve an earlier request after a later one.
#[derive(Debug, Default)]
pub struct GatedClient {
    gates: Mutex<VecDeque<oneshot::Receiver<Response>>>,
}

impl GatedClient {
    /// Queue a gate for the next request.
    pub fn gate(&self) -> oneshot::Sender<Response> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    async fn wait(&self) -> Response {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .pop_front()
            .expect("request without a gate");
        gate.await.expect("gate dropped without a response")
    }
}

impl ClientTrait for GatedClient {
    async fn get_collection(
        &self,
        _username: Option<&str>,
        _folder_id: FolderId,
        _page: PageRequest,
    ) -> Result<CollectionResponse, CatalogClientError> {
        match self.wait().await {
            Response::Collection(resp) => Ok(resp),
            Response::Error(err) => Err(err.into()),
            other => panic!("expected collection response, found {other:?}"),
        }
    }

    async fn get_collection_folders(
        &self,
        _username: Option<&str>,
    ) -> Result<CollectionFoldersResponse, CatalogClientError> {
        match self.wait().await {
            Response::Folders(resp) => Ok(resp),
            Response::Error(err) => Err(err.into()),
            other => panic!("expected folders response, found {other:?}"),
        }
    }

    async fn get_wantlist(
        &self,
        _username: Option<&str>,
        _page: PageRequest,
    ) -> Result<WantlistResponse, CatalogClientError> {
        match self.wait().await {
            Response::Wantlist(resp) => Ok(resp),
            Response::Error(err) => Err(err.into()),
            other => panic!("expected wantlist response, found {other:?}"),
        }
    }

    async fn get_release(
        &self,
        _release_id: ReleaseId,
    ) -> Result<ReleaseDetails, CatalogClientError> {
        match self.wait().await {
            Response::Release(resp) => Ok(resp),
            Response::Error(err) => Err(err.into()),
            other => panic!("expected release response, found {other:?}"),
        }
    }

    async fn search_releases(
        &self,
        _query: &str,
        _search_type: SearchType,
        _page: PageRequest,
    ) -> Result<SearchResponse, CatalogClientError> {
        match self.wait().await {
            Response::Search(resp) => Ok(resp),
            Response::Error(err) => Err(err.into()),
            other => panic!("expected search response, found {other:?}"),
        }
    }
}
