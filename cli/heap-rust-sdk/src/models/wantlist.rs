//! Local filtering and sorting of a loaded wantlist.

use std::cmp::Ordering;
use std::fmt::Display;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::fetch::{FetchController, FetchOutcome, FetchState, SkipReason};
use super::resources::{UserParams, Wantlist};
use crate::providers::catalog::{ClientTrait, WantlistItem};

/// The orders a wantlist can be displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WantlistSort {
    /// Most recently added first.
    #[default]
    DateAdded,
    /// By the name of the first credited artist, A to Z.
    Artist,
    /// By title, A to Z.
    Title,
    /// Newest release first, unknown years last.
    Year,
}

impl WantlistSort {
    pub const ALL: [WantlistSort; 4] = [
        WantlistSort::DateAdded,
        WantlistSort::Artist,
        WantlistSort::Title,
        WantlistSort::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WantlistSort::DateAdded => "date_added",
            WantlistSort::Artist => "artist",
            WantlistSort::Title => "title",
            WantlistSort::Year => "year",
        }
    }

    /// Human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            WantlistSort::DateAdded => "Date Added",
            WantlistSort::Artist => "Artist",
            WantlistSort::Title => "Title",
            WantlistSort::Year => "Year",
        }
    }

    pub fn compare(&self, a: &WantlistItem, b: &WantlistItem) -> Ordering {
        let (a_info, b_info) = (&a.basic_information, &b.basic_information);
        match self {
            WantlistSort::DateAdded => b.date_added.cmp(&a.date_added),
            WantlistSort::Artist => compare_text(a_info.first_artist(), b_info.first_artist()),
            WantlistSort::Title => compare_text(&a_info.title, &b_info.title),
            WantlistSort::Year => b_info.year_or_zero().cmp(&a_info.year_or_zero()),
        }
    }
}

impl Display for WantlistSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown sort key '{0}', expected one of: date_added, artist, title, year")]
pub struct UnknownSortKey(String);

impl FromStr for WantlistSort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WantlistSort::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// Case-insensitive comparison, falling back to the raw strings
/// so the order is total.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// A search query and sort order applied to already loaded items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WantlistFilter {
    pub query: String,
    pub sort: WantlistSort,
}

impl WantlistFilter {
    pub fn new(query: impl Into<String>, sort: WantlistSort) -> Self {
        Self {
            query: query.into(),
            sort,
        }
    }

    /// Whether the query filters anything.
    /// A blank query matches every item.
    pub fn is_searching(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Whether any query text was entered, blank or not.
    /// Entered text holds back further pages even when it filters nothing.
    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// Case-insensitive substring match against the title or any artist.
    ///
    /// Surrounding whitespace in a non-blank query is part of the needle.
    pub fn matches(&self, item: &WantlistItem) -> bool {
        if !self.is_searching() {
            return true;
        }
        let query = self.query.to_lowercase();
        let info = &item.basic_information;
        info.title.to_lowercase().contains(&query)
            || info
                .artists
                .iter()
                .any(|artist| artist.name.to_lowercase().contains(&query))
    }

    /// The matching items in display order.
    ///
    /// The sort is stable, items comparing equal keep their input order.
    pub fn apply<'a>(&self, items: impl IntoIterator<Item = &'a WantlistItem>) -> Vec<&'a WantlistItem> {
        let mut displayed: Vec<_> = items.into_iter().filter(|item| self.matches(item)).collect();
        displayed.sort_by(|a, b| self.sort.compare(a, b));
        displayed
    }
}

/// A wantlist with a local filter on top.
///
/// The filter only ever looks at pages already loaded,
/// so no further pages are requested while a search is active.
#[derive(Debug)]
pub struct WantlistBrowser {
    wants: FetchController<Wantlist>,
    filter: WantlistFilter,
}

impl WantlistBrowser {
    pub fn new(per_page: NonZeroU32) -> Self {
        Self {
            wants: FetchController::new(per_page),
            filter: WantlistFilter::default(),
        }
    }

    /// Load the first page of `username`'s wantlist.
    pub async fn open<C: ClientTrait>(&self, client: &C, username: Option<String>) -> FetchOutcome {
        self.wants
            .set_params(client, UserParams::new(username))
            .await
    }

    pub async fn refresh<C: ClientTrait>(&self, client: &C) -> FetchOutcome {
        self.wants.refresh(client).await
    }

    /// Load another page, unless a search query is active.
    pub async fn load_next_page<C: ClientTrait>(&self, client: &C) -> FetchOutcome {
        if self.filter.has_query() {
            debug!(query = %self.filter.query, "search active, not loading next page");
            return FetchOutcome::Skipped(SkipReason::FilterActive);
        }
        self.wants.load_next_page(client).await
    }

    /// Whether [Self::load_next_page] would issue a request.
    pub fn can_load_more(&self) -> bool {
        !self.filter.has_query() && !self.wants.is_loading() && self.wants.has_more()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    pub fn set_sort(&mut self, sort: WantlistSort) {
        self.filter.sort = sort;
    }

    pub fn filter(&self) -> &WantlistFilter {
        &self.filter
    }

    /// State of the underlying wantlist, unfiltered.
    pub fn state(&self) -> FetchState<WantlistItem> {
        self.wants.snapshot()
    }

    /// Loaded items after filtering and sorting.
    pub fn displayed(&self) -> Vec<WantlistItem> {
        self.wants.with_state(|state| {
            self.filter
                .apply(&state.items)
                .into_iter()
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::providers::catalog::MockClient;
    use crate::test_helpers::*;

    fn beatles() -> Vec<WantlistItem> {
        vec![
            wantlist_item(
                1,
                "Abbey Road",
                Some("The Beatles"),
                Some(1969),
                "2024-01-02T00:00:00Z",
            ),
            wantlist_item(
                2,
                "Revolver",
                Some("The Beatles"),
                Some(1966),
                "2024-01-05T00:00:00Z",
            ),
        ]
    }

    fn titles(items: &[&WantlistItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| item.basic_information.title.clone())
            .collect()
    }

    #[test]
    fn year_sort_is_newest_first() {
        let items = beatles();
        let filter = WantlistFilter::new("", WantlistSort::Year);
        assert_eq!(titles(&filter.apply(&items)), vec!["Abbey Road", "Revolver"]);
    }

    #[test]
    fn query_matches_title_case_insensitively() {
        let items = beatles();
        let filter = WantlistFilter::new("revolv", WantlistSort::DateAdded);
        assert_eq!(titles(&filter.apply(&items)), vec!["Revolver"]);

        let filter = WantlistFilter::new("REVOLV", WantlistSort::DateAdded);
        assert_eq!(titles(&filter.apply(&items)), vec!["Revolver"]);
    }

    #[test]
    fn query_matches_any_artist() {
        let mut item = wantlist_item(3, "Split", Some("Alpha"), None, "2024-01-01T00:00:00Z");
        item.basic_information.artists.push(crate::providers::catalog::ArtistCredit {
            name: "Omega Ensemble".to_string(),
            id: None,
        });
        let items = [item];
        let filter = WantlistFilter::new("ensemble", WantlistSort::DateAdded);
        assert_eq!(filter.apply(&items).len(), 1);
    }

    #[test]
    fn blank_query_is_no_filter() {
        let items = beatles();
        let filter = WantlistFilter::new("   ", WantlistSort::DateAdded);
        assert!(!filter.is_searching());
        assert_eq!(filter.apply(&items).len(), 2);
    }

    #[test]
    fn default_sort_is_most_recent_first() {
        let items = beatles();
        let filter = WantlistFilter::default();
        assert_eq!(filter.sort, WantlistSort::DateAdded);
        assert_eq!(titles(&filter.apply(&items)), vec!["Revolver", "Abbey Road"]);
    }

    #[test]
    fn artist_and_title_sorts_ignore_case() {
        let items = vec![
            wantlist_item(1, "b side", Some("zappa"), None, "2024-01-01T00:00:00Z"),
            wantlist_item(2, "A Side", Some("Abba"), None, "2024-01-01T00:00:00Z"),
            wantlist_item(3, "Untitled", None, None, "2024-01-01T00:00:00Z"),
        ];

        let by_artist = WantlistFilter::new("", WantlistSort::Artist);
        // no artist sorts as the empty name
        assert_eq!(titles(&by_artist.apply(&items)), vec![
            "Untitled", "A Side", "b side"
        ]);

        let by_title = WantlistFilter::new("", WantlistSort::Title);
        assert_eq!(titles(&by_title.apply(&items)), vec![
            "A Side", "b side", "Untitled"
        ]);
    }

    #[test]
    fn missing_year_sorts_last() {
        let items = vec![
            wantlist_item(1, "Unknown", Some("X"), None, "2024-01-01T00:00:00Z"),
            wantlist_item(2, "Old", Some("X"), Some(1950), "2024-01-01T00:00:00Z"),
        ];
        let filter = WantlistFilter::new("", WantlistSort::Year);
        assert_eq!(titles(&filter.apply(&items)), vec!["Old", "Unknown"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![
            wantlist_item(1, "First", Some("Same"), Some(1970), "2024-01-01T00:00:00Z"),
            wantlist_item(2, "Second", Some("Same"), Some(1970), "2024-01-01T00:00:00Z"),
            wantlist_item(3, "Third", Some("Same"), Some(1970), "2024-01-01T00:00:00Z"),
        ];
        for sort in [WantlistSort::DateAdded, WantlistSort::Artist, WantlistSort::Year] {
            let filter = WantlistFilter::new("", sort);
            assert_eq!(titles(&filter.apply(&items)), vec!["First", "Second", "Third"]);
        }
    }

    #[test]
    fn sort_keys_parse() {
        for sort in WantlistSort::ALL {
            assert_eq!(sort.as_str().parse::<WantlistSort>().unwrap(), sort);
        }
        assert_eq!("Year".parse::<WantlistSort>().unwrap(), WantlistSort::Year);
        assert!("rating".parse::<WantlistSort>().is_err());
    }

    proptest! {
        #[test]
        fn displayed_items_are_a_sorted_subset(
            entries in prop::collection::vec(
                ("[a-cA-C ]{0,6}", proptest::option::of(1950u32..2000), 0i64..1_000_000),
                0..20,
            ),
            query in "[a-c ]{0,2}",
            sort in prop::sample::select(WantlistSort::ALL.to_vec()),
        ) {
            let items: Vec<WantlistItem> = entries
                .iter()
                .enumerate()
                .map(|(i, (title, year, seconds))| {
                    let date = chrono::DateTime::from_timestamp(*seconds, 0).unwrap().to_rfc3339();
                    wantlist_item(i as u64, title, Some(title.as_str()), *year, &date)
                })
                .collect();
            let filter = WantlistFilter::new(query, sort);
            let displayed = filter.apply(&items);

            prop_assert_eq!(displayed.len(), items.iter().filter(|item| filter.matches(item)).count());
            for pair in displayed.windows(2) {
                prop_assert_ne!(sort.compare(pair[0], pair[1]), Ordering::Greater);
            }
        }
    }

    #[tokio::test]
    async fn search_suspends_pagination() {
        let client = MockClient::default();
        client.push_wantlist_response(wantlist_page(beatles(), 1, 2, 4));
        client.push_wantlist_response(wantlist_page(
            vec![wantlist_item(
                3,
                "Rubber Soul",
                Some("The Beatles"),
                Some(1965),
                "2024-01-01T00:00:00Z",
            )],
            2,
            2,
            4,
        ));

        let mut browser = WantlistBrowser::new(NonZeroU32::new(2).unwrap());
        browser.open(&client, Some("digger".to_string())).await;
        browser.set_query("revolv");
        assert!(!browser.can_load_more());
        assert_eq!(
            browser.load_next_page(&client).await,
            FetchOutcome::Skipped(SkipReason::FilterActive)
        );
        assert_eq!(client.requests().len(), 1);

        let displayed: Vec<_> = browser
            .displayed()
            .into_iter()
            .map(|item| item.basic_information.title)
            .collect();
        assert_eq!(displayed, vec!["Revolver"]);

        browser.set_query("");
        assert!(browser.can_load_more());
        assert_eq!(
            browser.load_next_page(&client).await,
            FetchOutcome::Loaded { page: 2 }
        );
        assert_eq!(browser.state().items.len(), 3);
    }

    #[tokio::test]
    async fn blank_query_still_suspends_pagination() {
        let client = MockClient::default();
        client.push_wantlist_response(wantlist_page(beatles(), 1, 2, 4));

        let mut browser = WantlistBrowser::new(NonZeroU32::new(2).unwrap());
        browser.open(&client, None).await;
        browser.set_query("   ");

        assert!(!browser.filter().is_searching());
        assert!(!browser.can_load_more());
        assert_eq!(
            browser.load_next_page(&client).await,
            FetchOutcome::Skipped(SkipReason::FilterActive)
        );
        assert_eq!(client.requests().len(), 1);
        assert_eq!(browser.displayed().len(), 2);
    }

    #[test]
    fn padded_query_keeps_its_whitespace() {
        let items = beatles();
        let filter = WantlistFilter::new(" revolv", WantlistSort::DateAdded);
        assert!(filter.apply(&items).is_empty());

        let filter = WantlistFilter::new("abbey ", WantlistSort::DateAdded);
        assert_eq!(titles(&filter.apply(&items)), vec!["Abbey Road"]);
    }

    #[tokio::test]
    async fn sort_does_not_reorder_loaded_items() {
        let client = MockClient::default();
        client.push_wantlist_response(wantlist_page(beatles(), 1, 1, 2));

        let mut browser = WantlistBrowser::new(NonZeroU32::new(2).unwrap());
        browser.open(&client, None).await;
        browser.set_sort(WantlistSort::Title);

        let displayed: Vec<_> = browser
            .displayed()
            .into_iter()
            .map(|item| item.id.0)
            .collect();
        assert_eq!(displayed, vec![1, 2]);
        let loaded: Vec<_> = browser.state().items.iter().map(|item| item.id.0).collect();
        assert_eq!(loaded, vec![1, 2]);

        browser.set_sort(WantlistSort::DateAdded);
        let displayed: Vec<_> = browser
            .displayed()
            .into_iter()
            .map(|item| item.id.0)
            .collect();
        assert_eq!(displayed, vec![2, 1]);
    }
}
