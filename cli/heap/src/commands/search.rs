use std::num::NonZeroU32;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use heap_rust_sdk::providers::catalog::{Client, ClientTrait, PageRequest, SearchType};
use tracing::{debug, instrument};

use super::per_page;
use crate::config::Config;
use crate::utils::display::DisplaySearchResults;
use crate::utils::{message, print_json};

// Search the release database
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Display search results as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// What to search for: release, master, artist or label
    #[bpaf(long("type"), short('t'), argument("TYPE"), fallback(SearchType::Release))]
    pub search_type: SearchType,

    /// The page of results to show
    #[bpaf(long, argument("N"), fallback(NonZeroU32::MIN))]
    pub page: NonZeroU32,

    /// Number of results per page
    #[bpaf(long, argument("N"))]
    pub per_page: Option<NonZeroU32>,

    /// The search query
    #[bpaf(positional("QUERY"))]
    pub query: String,
}

impl Search {
    #[instrument(name = "search", fields(query = %self.query, search_type = %self.search_type), skip_all)]
    pub async fn handle(self, config: &Config, client: &Client) -> Result<()> {
        let page = PageRequest {
            page: self.page.get(),
            per_page: per_page(self.per_page, config)?,
        };
        debug!(?page, "searching");

        let response = client
            .search_releases(&self.query, self.search_type, page)
            .await
            .with_context(|| format!("Failed to search for '{}'", self.query))?;

        if self.json {
            return print_json(&response.results);
        }

        if response.results.is_empty() {
            message::plain(format!("No results found for '{}'", self.query));
            return Ok(());
        }

        print!("{}", DisplaySearchResults(&response.results));
        let pagination = &response.pagination;
        if pagination.has_more_after(pagination.page) {
            message::plain(format!(
                "Page {} of {} ({} results), use '--page {}' to see more",
                pagination.page,
                pagination.pages,
                pagination.items,
                pagination.page + 1
            ));
        }
        Ok(())
    }
}
