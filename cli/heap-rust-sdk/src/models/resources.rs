//! The resources a [FetchController](super::fetch::FetchController) can page
//! through, and the query parameters identifying them.

use crate::models::fetch::FetchKind;
use crate::providers::catalog::{
    CatalogClientError,
    ClientTrait,
    CollectionItem,
    Folder,
    FolderId,
    PageRequest,
    ReleaseDetails,
    ReleaseId,
    ResultsPage,
    WantlistItem,
};

/// Parameters of resources that only depend on whose data is shown.
///
/// `None` selects the configured default identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserParams {
    pub username: Option<String>,
}

impl UserParams {
    pub fn new(username: Option<String>) -> Self {
        Self { username }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionParams {
    pub username: Option<String>,
    pub folder_id: FolderId,
}

/// Releases in a collection folder, paginated.
#[derive(Debug)]
pub struct Collection;

impl FetchKind for Collection {
    type Item = CollectionItem;
    type Params = CollectionParams;

    const NAME: &'static str = "collection";

    async fn fetch_page<C: ClientTrait>(
        client: &C,
        params: &Self::Params,
        page: PageRequest,
    ) -> Result<ResultsPage<Self::Item>, CatalogClientError> {
        client
            .get_collection(params.username.as_deref(), params.folder_id, page)
            .await
            .map(Into::into)
    }
}

/// A wantlist, paginated.
#[derive(Debug)]
pub struct Wantlist;

impl FetchKind for Wantlist {
    type Item = WantlistItem;
    type Params = UserParams;

    const NAME: &'static str = "wantlist";

    async fn fetch_page<C: ClientTrait>(
        client: &C,
        params: &Self::Params,
        page: PageRequest,
    ) -> Result<ResultsPage<Self::Item>, CatalogClientError> {
        client
            .get_wantlist(params.username.as_deref(), page)
            .await
            .map(Into::into)
    }
}

/// The folders of a collection.
///
/// Returned in one piece, so every fetch yields a single complete page.
#[derive(Debug)]
pub struct Folders;

impl FetchKind for Folders {
    type Item = Folder;
    type Params = UserParams;

    const NAME: &'static str = "folders";

    async fn fetch_page<C: ClientTrait>(
        client: &C,
        params: &Self::Params,
        _page: PageRequest,
    ) -> Result<ResultsPage<Self::Item>, CatalogClientError> {
        let response = client
            .get_collection_folders(params.username.as_deref())
            .await?;
        Ok(ResultsPage::single(response.folders))
    }
}

/// Details of a single release.
#[derive(Debug)]
pub struct Release;

impl FetchKind for Release {
    type Item = ReleaseDetails;
    type Params = ReleaseId;

    const NAME: &'static str = "release";

    async fn fetch_page<C: ClientTrait>(
        client: &C,
        params: &Self::Params,
        _page: PageRequest,
    ) -> Result<ResultsPage<Self::Item>, CatalogClientError> {
        let release = client.get_release(*params).await?;
        Ok(ResultsPage::single(vec![release]))
    }
}
