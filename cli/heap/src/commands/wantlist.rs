use std::num::NonZeroU32;

use anyhow::Result;
use bpaf::Bpaf;
use heap_rust_sdk::models::fetch::FetchOutcome;
use heap_rust_sdk::models::wantlist::{WantlistBrowser, WantlistFilter, WantlistSort};
use heap_rust_sdk::providers::catalog::Client;
use tracing::{debug, instrument};

use super::{PageLimit, page_limit, per_page, print_records};
use crate::config::Config;
use crate::utils::display::RecordSummary;
use crate::utils::message;

// List, search and sort a wantlist
#[derive(Debug, Bpaf, Clone)]
pub struct Wantlist {
    /// Display releases as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// Whose wantlist to list (default: the configured username)
    #[bpaf(long, short, argument("USER"))]
    pub user: Option<String>,

    /// Only show releases whose title or artist contains this text
    ///
    /// Only loaded pages are searched.
    #[bpaf(long, short, argument("TEXT"))]
    pub search: Option<String>,

    /// Sort by date_added, artist, title or year
    /// (default: 'wantlist_sort' from config)
    #[bpaf(long, argument("KEY"))]
    pub sort: Option<WantlistSort>,

    #[bpaf(external(page_limit), fallback(PageLimit::default()))]
    pub pages: PageLimit,

    /// Number of releases per page
    #[bpaf(long, argument("N"))]
    pub per_page: Option<NonZeroU32>,
}

impl Wantlist {
    #[instrument(name = "wantlist", skip_all)]
    pub async fn handle(self, config: &Config, client: &Client) -> Result<()> {
        let browser = self.load(config, client).await?;

        let state = browser.state();
        let records: Vec<RecordSummary> = browser
            .displayed()
            .iter()
            .map(RecordSummary::from)
            .collect();

        if !self.json {
            message::plain(heading(browser.filter(), records.len(), state.items.len()));
        }

        print_records(&state, &records, self.json, "releases")
    }

    /// Load the requested pages, then apply search and sort.
    ///
    /// No more pages are requested once a search is applied,
    /// so pages are loaded before it.
    async fn load(&self, config: &Config, client: &Client) -> Result<WantlistBrowser> {
        let mut browser = WantlistBrowser::new(per_page(self.per_page, config)?);
        browser.set_sort(self.sort.unwrap_or(config.heap.wantlist_sort));
        browser.open(client, self.user.clone()).await;

        let mut loaded = 1;
        while self.pages.wants_more(loaded) && browser.can_load_more() {
            match browser.load_next_page(client).await {
                FetchOutcome::Loaded { .. } => loaded += 1,
                outcome => {
                    debug!(?outcome, "stopped loading pages");
                    break;
                },
            }
        }

        if let Some(query) = &self.search {
            browser.set_query(query.clone());
        }
        Ok(browser)
    }
}

fn heading(filter: &WantlistFilter, shown: usize, loaded: usize) -> String {
    if filter.is_searching() {
        format!(
            "{shown} of {loaded} loaded releases match '{}', sorted by {}",
            filter.query.trim(),
            filter.sort.label()
        )
    } else {
        format!("{loaded} releases, sorted by {}", filter.sort.label())
    }
}
