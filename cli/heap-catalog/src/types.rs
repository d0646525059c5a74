//! Catalog interaction types.
//!
//! These mirror the JSON records of the remote catalog API.
//! Fields the API documents as optional (or omits for some releases)
//! are `Option`s or default to empty collections.

use std::fmt::Display;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A user-defined collection folder.
///
/// [FolderId::ALL] (`0`) is the reserved pseudo-folder containing every item
/// of a collection.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct FolderId(pub u64);

impl FolderId {
    pub const ALL: FolderId = FolderId(0);

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct ReleaseId(pub u64);

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(50).unwrap();

/// Page coordinates of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub per_page: NonZeroU32,
}

impl PageRequest {
    pub fn first(per_page: NonZeroU32) -> Self {
        Self { page: 1, per_page }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Page metadata returned alongside every paginated batch.
///
/// Authoritative for "has more" decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    /// Total number of items across all pages.
    pub items: u64,
    #[serde(default, skip_serializing_if = "PaginationUrls::is_empty")]
    pub urls: PaginationUrls,
}

impl Pagination {
    /// Metadata for a resource the API returns in one piece.
    pub fn single(count: usize) -> Self {
        Self {
            page: 1,
            pages: 1,
            per_page: count as u32,
            items: count as u64,
            urls: PaginationUrls::default(),
        }
    }

    /// Whether a page after `page` exists.
    pub fn has_more_after(&self, page: u32) -> bool {
        page < self.pages
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationUrls {
    pub first: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

impl PaginationUrls {
    fn is_empty(&self) -> bool {
        self.first.is_none() && self.prev.is_none() && self.next.is_none() && self.last.is_none()
    }
}

/// Generic paginated result container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsPage<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ResultsPage<T> {
    /// Wrap an unpaginated list as a single complete page.
    pub fn single(results: Vec<T>) -> Self {
        let pagination = Pagination::single(results.len());
        Self {
            results,
            pagination,
        }
    }
}

// ---------------------------------------------------------------------------
// Collection and wantlist records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCredit {
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSummary {
    pub name: String,
    #[serde(default)]
    pub qty: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

/// Which list a record is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Collection,
    Wantlist,
}

/// Release summary nested in collection and wantlist items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInformation {
    #[serde(default)]
    pub id: Option<ReleaseId>,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub artists: Vec<ArtistCredit>,
    #[serde(default)]
    pub formats: Vec<FormatSummary>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl BasicInformation {
    /// Release year, `0` if unknown.
    pub fn year_or_zero(&self) -> u32 {
        self.year.unwrap_or(0)
    }

    /// Name of the first credited artist, empty if there is none.
    pub fn first_artist(&self) -> &str {
        self.artists
            .first()
            .map(|artist| artist.name.as_str())
            .unwrap_or_default()
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Collection entries show the cover image, wantlist entries the thumbnail.
    pub fn image_for(&self, kind: RecordKind) -> Option<&str> {
        match kind {
            RecordKind::Collection => self.cover_image.as_deref(),
            RecordKind::Wantlist => self.thumb.as_deref(),
        }
    }
}

/// An owned copy of a release.
///
/// `instance_id` distinguishes duplicate copies of the same release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: ReleaseId,
    pub instance_id: u64,
    pub date_added: DateTime<FixedOffset>,
    pub basic_information: BasicInformation,
}

/// A wanted release, one entry per release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantlistItem {
    pub id: ReleaseId,
    pub date_added: DateTime<FixedOffset>,
    pub basic_information: BasicInformation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub count: u64,
    #[serde(default)]
    pub resource_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub releases: Vec<CollectionItem>,
    pub pagination: Pagination,
}

impl From<CollectionResponse> for ResultsPage<CollectionItem> {
    fn from(response: CollectionResponse) -> Self {
        Self {
            results: response.releases,
            pagination: response.pagination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionFoldersResponse {
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WantlistResponse {
    pub wants: Vec<WantlistItem>,
    pub pagination: Pagination,
}

impl From<WantlistResponse> for ResultsPage<WantlistItem> {
    fn from(response: WantlistResponse) -> Self {
        Self {
            results: response.wants,
            pagination: response.pagination,
        }
    }
}

// ---------------------------------------------------------------------------
// Release details
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArtist {
    pub name: String,
    pub id: u64,
    #[serde(default)]
    pub resource_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseLabel {
    pub name: String,
    #[serde(default)]
    pub catno: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    pub id: u64,
    #[serde(default)]
    pub resource_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFormat {
    pub name: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub position: String,
    pub title: String,
    #[serde(default)]
    pub duration: String,
}

/// Full details of one release, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDetails {
    pub id: ReleaseId,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<ReleaseArtist>,
    #[serde(default)]
    pub labels: Vec<ReleaseLabel>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub formats: Vec<ReleaseFormat>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub tracklist: Vec<Track>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

// ---------------------------------------------------------------------------
// Database search
// ---------------------------------------------------------------------------

/// The kinds of entities the database search can be restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Release,
    Master,
    Artist,
    Label,
}

impl SearchType {
    pub const ALL: [SearchType; 4] = [
        SearchType::Release,
        SearchType::Master,
        SearchType::Artist,
        SearchType::Label,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Release => "release",
            SearchType::Master => "master",
            SearchType::Artist => "artist",
            SearchType::Label => "label",
        }
    }
}

impl Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown search type '{0}', expected one of: release, master, artist, label")]
pub struct UnknownSearchType(String);

impl FromStr for SearchType {
    type Err = UnknownSearchType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchType::ALL
            .into_iter()
            .find(|search_type| search_type.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSearchType(s.to_string()))
    }
}

/// A single database search hit.
///
/// The shape depends on the hit's type, so everything but the identity is
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    #[serde(rename = "type")]
    pub result_type: SearchType,
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub format: Vec<String>,
    #[serde(default)]
    pub label: Vec<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub style: Vec<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub master_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub pagination: Pagination,
}
