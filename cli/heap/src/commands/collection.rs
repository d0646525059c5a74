use std::num::NonZeroU32;

use anyhow::Result;
use bpaf::Bpaf;
use heap_rust_sdk::models::collection::CollectionBrowser;
use heap_rust_sdk::models::fetch::FetchOutcome;
use heap_rust_sdk::providers::catalog::{Client, Folder, FolderId};
use tracing::{debug, instrument};

use super::{PageLimit, page_limit, per_page, print_records};
use crate::config::Config;
use crate::utils::display::RecordSummary;
use crate::utils::message;

// List the releases in a collection
#[derive(Debug, Bpaf, Clone)]
pub struct Collection {
    /// Display releases as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// Whose collection to list (default: the configured username)
    #[bpaf(long, short, argument("USER"))]
    pub user: Option<String>,

    /// The folder to list, 0 lists the whole collection
    #[bpaf(long, short, argument("ID"), fallback(FolderId::ALL))]
    pub folder: FolderId,

    #[bpaf(external(page_limit), fallback(PageLimit::default()))]
    pub pages: PageLimit,

    /// Number of releases per page
    #[bpaf(long, argument("N"))]
    pub per_page: Option<NonZeroU32>,
}

impl Collection {
    #[instrument(name = "collection", fields(folder = %self.folder), skip_all)]
    pub async fn handle(self, config: &Config, client: &Client) -> Result<()> {
        let browser = CollectionBrowser::new(self.user, per_page(self.per_page, config)?);
        let (folders, _) = browser.open(client, self.folder).await;

        let mut loaded = 1;
        while self.pages.wants_more(loaded) && browser.has_more() {
            match browser.load_next_page(client).await {
                FetchOutcome::Loaded { .. } => loaded += 1,
                outcome => {
                    debug!(?outcome, "stopped loading pages");
                    break;
                },
            }
        }

        let state = browser.releases();

        // The folder list only adds a heading, listing releases works without it.
        if folders == (FetchOutcome::Loaded { page: 1 }) && !self.json {
            let folder_state = browser.folders();
            if let Some(heading) = folder_heading(
                &folder_state.items,
                browser.selected_folder(),
                state.pagination.as_ref().map(|pagination| pagination.items),
            ) {
                message::plain(heading);
            }
        }

        let records: Vec<RecordSummary> = state.items.iter().map(RecordSummary::from).collect();
        print_records(&state, &records, self.json, "releases")
    }
}

/// Name and size of the listed folder.
///
/// The catalog usually lists the whole collection as a folder of its own,
/// when it does not the heading falls back to the collection total.
fn folder_heading(folders: &[Folder], selected: FolderId, total: Option<u64>) -> Option<String> {
    match folders.iter().find(|folder| folder.id == selected) {
        Some(folder) => Some(format!("{} ({} releases)", folder.name, folder.count)),
        None if selected.is_all() => total.map(|total| format!("All ({total} releases)")),
        None => None,
    }
}
