use std::num::NonZeroU32;

use super::fetch::{FetchController, FetchOutcome, FetchState};
use super::resources::{Collection, CollectionParams, Folders, UserParams};
use crate::providers::catalog::{ClientTrait, CollectionItem, Folder, FolderId};

/// A collection browsed one folder at a time.
///
/// Folders and the releases of the selected folder load independently.
/// Selecting another folder starts over at its first page.
#[derive(Debug)]
pub struct CollectionBrowser {
    username: Option<String>,
    folders: FetchController<Folders>,
    releases: FetchController<Collection>,
}

impl CollectionBrowser {
    pub fn new(username: Option<String>, per_page: NonZeroU32) -> Self {
        Self {
            username,
            folders: FetchController::default(),
            releases: FetchController::new(per_page),
        }
    }

    /// Load the folder list and the first page of `folder_id`.
    pub async fn open<C: ClientTrait>(
        &self,
        client: &C,
        folder_id: FolderId,
    ) -> (FetchOutcome, FetchOutcome) {
        futures::join!(
            self.folders
                .set_params(client, UserParams::new(self.username.clone())),
            self.select_folder(client, folder_id),
        )
    }

    pub async fn select_folder<C: ClientTrait>(
        &self,
        client: &C,
        folder_id: FolderId,
    ) -> FetchOutcome {
        let params = CollectionParams {
            username: self.username.clone(),
            folder_id,
        };
        self.releases.set_params(client, params).await
    }

    pub async fn load_next_page<C: ClientTrait>(&self, client: &C) -> FetchOutcome {
        self.releases.load_next_page(client).await
    }

    pub async fn refresh<C: ClientTrait>(&self, client: &C) -> FetchOutcome {
        self.releases.refresh(client).await
    }

    /// The selected folder, [FolderId::ALL] before anything was selected.
    pub fn selected_folder(&self) -> FolderId {
        self.releases
            .params()
            .map(|params| params.folder_id)
            .unwrap_or(FolderId::ALL)
    }

    pub fn has_more(&self) -> bool {
        self.releases.has_more()
    }

    pub fn folders(&self) -> FetchState<Folder> {
        self.folders.snapshot()
    }

    pub fn releases(&self) -> FetchState<CollectionItem> {
        self.releases.snapshot()
    }
}
