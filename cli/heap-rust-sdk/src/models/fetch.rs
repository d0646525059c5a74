//! Sequencing of paginated fetches for a single resource.
//!
//! A [FetchController] owns the accumulated results of one resource
//! (a collection folder, a wantlist, ...) and the parameters they were
//! requested with.
//! It never returns errors from its operations,
//! failures are stored in its [FetchState] for consumers to observe.
//!
//! Only the most recently requested parameters are ever applied.
//! Every fetch carries a ticket with the generation and parameters it was
//! issued for, and responses whose ticket no longer matches are dropped.
//! In-flight requests are never aborted.

use std::fmt::Debug;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::providers::catalog::{
    CatalogClientError,
    ClientTrait,
    DEFAULT_PAGE_SIZE,
    PageRequest,
    Pagination,
    ResultsPage,
};

/// A resource that can be fetched page by page.
#[allow(async_fn_in_trait)]
pub trait FetchKind {
    /// Parameters identifying one logical result set.
    /// Any change resets the accumulated items.
    type Params: Clone + PartialEq + Debug;
    type Item: Clone + Debug;

    /// Name used in logs.
    const NAME: &'static str;

    async fn fetch_page<C: ClientTrait>(
        client: &C,
        params: &Self::Params,
        page: PageRequest,
    ) -> Result<ResultsPage<Self::Item>, CatalogClientError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    /// Nothing was requested yet.
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Observable state of a [FetchController].
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    /// Items of all pages loaded for the current parameters, in arrival order.
    pub items: Vec<T>,
    pub status: FetchStatus,
    /// The error of the last fetch, if it failed.
    pub error: Option<Arc<CatalogClientError>>,
    /// The last page loaded successfully (1-based).
    pub current_page: u32,
    /// Page metadata of the last successful fetch.
    pub pagination: Option<Pagination>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: FetchStatus::Idle,
            error: None,
            current_page: 1,
            pagination: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Whether a page after [Self::current_page] is known to exist.
    pub fn has_more(&self) -> bool {
        self.pagination
            .as_ref()
            .is_some_and(|pagination| pagination.has_more_after(self.current_page))
    }

    fn reset(&mut self) {
        self.items.clear();
        self.current_page = 1;
        self.pagination = None;
    }

    fn start_loading(&mut self) {
        self.status = FetchStatus::Loading;
        self.error = None;
    }
}

/// What became of a requested fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was applied to the state.
    Loaded { page: u32 },
    /// The fetch failed, the error is stored in the state.
    Failed,
    /// A newer request replaced this one while it was in flight.
    /// Its response was discarded.
    Superseded,
    /// No request was issued.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No parameters were set yet.
    NoParams,
    /// The parameters are already loaded or loading.
    Unchanged,
    /// A fetch is already in flight.
    InFlight,
    /// The last page is already loaded.
    NoMorePages,
    /// Pagination is suspended while a search filter is applied.
    FilterActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    Replace,
    Append,
}

/// Identifies an issued fetch.
#[derive(Debug)]
struct Ticket<P> {
    generation: u64,
    params: P,
    request: PageRequest,
    merge: Merge,
}

#[derive(Debug)]
struct Inner<K: FetchKind> {
    params: Option<K::Params>,
    /// Incremented whenever accumulated items are discarded.
    generation: u64,
    state: FetchState<K::Item>,
}

/// Sequences fetches of a [FetchKind] and accumulates their pages.
///
/// The controller does not own a client,
/// every operation is given the client to issue requests with.
/// The state lock is never held across a request.
#[derive(Debug)]
pub struct FetchController<K: FetchKind> {
    per_page: NonZeroU32,
    inner: Mutex<Inner<K>>,
}

impl<K: FetchKind> Default for FetchController<K> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<K: FetchKind> FetchController<K> {
    pub fn new(per_page: NonZeroU32) -> Self {
        Self {
            per_page,
            inner: Mutex::new(Inner {
                params: None,
                generation: 0,
                state: FetchState::default(),
            }),
        }
    }

    pub fn per_page(&self) -> NonZeroU32 {
        self.per_page
    }

    pub fn params(&self) -> Option<K::Params> {
        self.lock().params.clone()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> FetchState<K::Item> {
        self.lock().state.clone()
    }

    /// Inspect the current state without copying it.
    pub fn with_state<R>(&self, f: impl FnOnce(&FetchState<K::Item>) -> R) -> R {
        f(&self.lock().state)
    }

    pub fn has_more(&self) -> bool {
        self.lock().state.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.is_loading()
    }

    /// Load the first page for `params`.
    ///
    /// If `params` differ from the current ones, accumulated items are
    /// discarded and any fetch still in flight is superseded.
    /// Setting the current parameters again is a no-op,
    /// use [Self::refresh] to reload them.
    pub async fn set_params<C: ClientTrait>(&self, client: &C, params: K::Params) -> FetchOutcome {
        let ticket = {
            let mut inner = self.lock();
            if inner.params.as_ref() == Some(&params) && inner.state.status != FetchStatus::Idle {
                debug!(kind = K::NAME, ?params, "parameters unchanged");
                return FetchOutcome::Skipped(SkipReason::Unchanged);
            }
            self.restart(&mut inner, params)
        };
        self.run(client, ticket).await
    }

    /// Reload the first page for the current parameters,
    /// discarding accumulated items.
    pub async fn refresh<C: ClientTrait>(&self, client: &C) -> FetchOutcome {
        let ticket = {
            let mut inner = self.lock();
            let Some(params) = inner.params.clone() else {
                return FetchOutcome::Skipped(SkipReason::NoParams);
            };
            self.restart(&mut inner, params)
        };
        self.run(client, ticket).await
    }

    /// Load the page after [FetchState::current_page] and append its items.
    ///
    /// A no-op if the last page is loaded or a fetch is in flight.
    pub async fn load_next_page<C: ClientTrait>(&self, client: &C) -> FetchOutcome {
        let ticket = {
            let mut inner = self.lock();
            let Some(params) = inner.params.clone() else {
                return FetchOutcome::Skipped(SkipReason::NoParams);
            };
            if inner.state.is_loading() {
                debug!(kind = K::NAME, "fetch in flight, not loading next page");
                return FetchOutcome::Skipped(SkipReason::InFlight);
            }
            if !inner.state.has_more() {
                debug!(
                    kind = K::NAME,
                    current_page = inner.state.current_page,
                    "no more pages"
                );
                return FetchOutcome::Skipped(SkipReason::NoMorePages);
            }
            inner.state.start_loading();
            Ticket {
                generation: inner.generation,
                params,
                request: PageRequest {
                    page: inner.state.current_page + 1,
                    per_page: self.per_page,
                },
                merge: Merge::Append,
            }
        };
        self.run(client, ticket).await
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K>> {
        self.inner.lock().expect("fetch state mutex poisoned")
    }

    /// Discard accumulated items and issue a ticket for the first page
    /// of `params`.
    fn restart(&self, inner: &mut Inner<K>, params: K::Params) -> Ticket<K::Params> {
        inner.params = Some(params.clone());
        inner.generation += 1;
        inner.state.reset();
        inner.state.start_loading();
        Ticket {
            generation: inner.generation,
            params,
            request: PageRequest::first(self.per_page),
            merge: Merge::Replace,
        }
    }

    async fn run<C: ClientTrait>(&self, client: &C, ticket: Ticket<K::Params>) -> FetchOutcome {
        debug!(
            kind = K::NAME,
            params = ?ticket.params,
            page = ticket.request.page,
            generation = ticket.generation,
            "fetching page"
        );
        let result = K::fetch_page(client, &ticket.params, ticket.request).await;
        self.finish(ticket, result)
    }

    fn finish(
        &self,
        ticket: Ticket<K::Params>,
        result: Result<ResultsPage<K::Item>, CatalogClientError>,
    ) -> FetchOutcome {
        let mut inner = self.lock();
        if ticket.generation != inner.generation || inner.params.as_ref() != Some(&ticket.params) {
            debug!(
                kind = K::NAME,
                params = ?ticket.params,
                page = ticket.request.page,
                "discarding response for superseded request"
            );
            return FetchOutcome::Superseded;
        }

        let state = &mut inner.state;
        match result {
            Ok(page) => {
                match ticket.merge {
                    Merge::Replace => state.items = page.results,
                    Merge::Append => state.items.extend(page.results),
                }
                let total = page.pagination.items;
                if state.items.len() as u64 > total {
                    warn!(
                        kind = K::NAME,
                        total,
                        accumulated = state.items.len(),
                        "more items than reported in total, truncating"
                    );
                    state.items.truncate(total as usize);
                }
                state.current_page = ticket.request.page;
                state.pagination = Some(page.pagination);
                state.status = FetchStatus::Ready;
                debug!(
                    kind = K::NAME,
                    page = ticket.request.page,
                    items = state.items.len(),
                    "page loaded"
                );
                FetchOutcome::Loaded {
                    page: ticket.request.page,
                }
            },
            Err(err) => {
                debug!(kind = K::NAME, page = ticket.request.page, %err, "fetch failed");
                state.error = Some(Arc::new(err));
                state.status = FetchStatus::Failed;
                FetchOutcome::Failed
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::resources::{Collection, CollectionParams};
    use crate::providers::catalog::{FolderId, MockClient, MockRequest, Response};
    use crate::test_helpers::*;

    fn params(folder: u64) -> CollectionParams {
        CollectionParams {
            username: Some("digger".to_string()),
            folder_id: FolderId(folder),
        }
    }

    fn ids(state: &FetchState<crate::providers::catalog::CollectionItem>) -> Vec<u64> {
        state.items.iter().map(|item| item.id.0).collect()
    }

    fn controller() -> FetchController<Collection> {
        FetchController::new(NonZeroU32::new(2).unwrap())
    }

    #[tokio::test]
    async fn pages_are_concatenated_in_order() {
        let client = MockClient::default();
        client.push_collection_response(collection_page(&[1, 2], 1, 2, 4));
        client.push_collection_response(collection_page(&[3, 4], 2, 2, 4));

        let controller = controller();
        assert_eq!(
            controller.set_params(&client, params(0)).await,
            FetchOutcome::Loaded { page: 1 }
        );
        assert!(controller.has_more());
        assert_eq!(
            controller.load_next_page(&client).await,
            FetchOutcome::Loaded { page: 2 }
        );

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![1, 2, 3, 4]);
        assert_eq!(state.current_page, 2);
        assert_eq!(state.status, FetchStatus::Ready);
        assert!(!state.has_more());

        let pages: Vec<u32> = client
            .requests()
            .into_iter()
            .map(|request| match request {
                MockRequest::Collection { page, .. } => page.page,
                other => panic!("unexpected request {other:?}"),
            })
            .collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[tokio::test]
    async fn changing_folder_discards_items() {
        let client = MockClient::default();
        client.push_collection_response(collection_page(&[1, 2], 1, 2, 4));
        client.push_collection_response(collection_page(&[3, 4], 2, 2, 4));
        client.push_collection_response(collection_page(&[9], 1, 1, 1));

        let controller = controller();
        controller.set_params(&client, params(0)).await;
        controller.load_next_page(&client).await;
        assert_eq!(
            controller.set_params(&client, params(7)).await,
            FetchOutcome::Loaded { page: 1 }
        );

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![9]);
        assert_eq!(state.current_page, 1);
        assert_eq!(controller.params(), Some(params(7)));
        assert_eq!(client.requests()[2], MockRequest::Collection {
            username: Some("digger".to_string()),
            folder_id: FolderId(7),
            page: PageRequest::first(NonZeroU32::new(2).unwrap()),
        });
    }

    #[tokio::test]
    async fn failed_page_keeps_accumulated_items() {
        let client = MockClient::default();
        client.push_collection_response(collection_page(&[1, 2], 1, 2, 4));
        client.push_response(error_response(401, "You must authenticate"));

        let controller = controller();
        controller.set_params(&client, params(0)).await;
        assert_eq!(
            controller.load_next_page(&client).await,
            FetchOutcome::Failed
        );

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![1, 2]);
        assert!(!state.is_loading());
        assert_eq!(state.status, FetchStatus::Failed);
        let status = state.error.as_ref().and_then(|err| err.status());
        assert_eq!(status.map(|status| status.as_u16()), Some(401));
        assert_eq!(state.current_page, 1);
    }

    #[tokio::test]
    async fn failed_page_is_retried() {
        let client = MockClient::default();
        client.push_collection_response(collection_page(&[1, 2], 1, 2, 4));
        client.push_response(error_response(503, ""));
        client.push_collection_response(collection_page(&[3, 4], 2, 2, 4));

        let controller = controller();
        controller.set_params(&client, params(0)).await;
        controller.load_next_page(&client).await;
        assert_eq!(
            controller.load_next_page(&client).await,
            FetchOutcome::Loaded { page: 2 }
        );

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![1, 2, 3, 4]);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn next_page_after_last_is_noop() {
        let client = MockClient::default();
        client.push_collection_response(collection_page(&[1, 2], 1, 1, 2));

        let controller = controller();
        controller.set_params(&client, params(0)).await;
        let before = controller.snapshot();

        assert_eq!(
            controller.load_next_page(&client).await,
            FetchOutcome::Skipped(SkipReason::NoMorePages)
        );
        let after = controller.snapshot();
        assert_eq!(client.requests().len(), 1);
        assert_eq!(ids(&after), ids(&before));
        assert_eq!(after.current_page, before.current_page);
        assert_eq!(after.status, before.status);
        assert_eq!(after.pagination, before.pagination);
    }

    #[tokio::test]
    async fn operations_without_params_are_skipped() {
        let client = MockClient::default();
        let controller = controller();

        assert_eq!(
            controller.load_next_page(&client).await,
            FetchOutcome::Skipped(SkipReason::NoParams)
        );
        assert_eq!(
            controller.refresh(&client).await,
            FetchOutcome::Skipped(SkipReason::NoParams)
        );
        assert!(client.requests().is_empty());
        assert_eq!(controller.snapshot().status, FetchStatus::Idle);
    }

    #[tokio::test]
    async fn same_params_are_not_refetched() {
        let client = MockClient::default();
        client.push_collection_response(collection_page(&[1], 1, 1, 1));
        client.push_collection_response(collection_page(&[1, 5], 1, 1, 2));

        let controller = controller();
        controller.set_params(&client, params(0)).await;
        assert_eq!(
            controller.set_params(&client, params(0)).await,
            FetchOutcome::Skipped(SkipReason::Unchanged)
        );
        assert_eq!(client.requests().len(), 1);

        assert_eq!(
            controller.refresh(&client).await,
            FetchOutcome::Loaded { page: 1 }
        );
        assert_eq!(ids(&controller.snapshot()), vec![1, 5]);
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let client = GatedClient::default();
        let first = client.gate();
        let second = client.gate();
        let controller = controller();

        let (first_outcome, second_outcome, ()) = futures::join!(
            controller.set_params(&client, params(1)),
            controller.set_params(&client, params(2)),
            async {
                // the later request resolves first
                second
                    .send(Response::Collection(collection_page(&[20], 1, 1, 1)))
                    .unwrap();
                first
                    .send(Response::Collection(collection_page(&[10], 1, 1, 1)))
                    .unwrap();
            }
        );

        assert_eq!(first_outcome, FetchOutcome::Superseded);
        assert_eq!(second_outcome, FetchOutcome::Loaded { page: 1 });
        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![20]);
        assert_eq!(controller.params(), Some(params(2)));
    }

    #[tokio::test]
    async fn stale_next_page_is_discarded_after_param_change() {
        let client = GatedClient::default();
        let controller = controller();

        client
            .gate()
            .send(Response::Collection(collection_page(&[1, 2], 1, 2, 4)))
            .unwrap();
        controller.set_params(&client, params(0)).await;

        let next_page = client.gate();
        let other_folder = client.gate();
        let (next_outcome, folder_outcome, ()) = futures::join!(
            controller.load_next_page(&client),
            controller.set_params(&client, params(3)),
            async {
                other_folder
                    .send(Response::Collection(collection_page(&[30], 1, 1, 1)))
                    .unwrap();
                next_page
                    .send(Response::Collection(collection_page(&[3, 4], 2, 2, 4)))
                    .unwrap();
            }
        );

        assert_eq!(next_outcome, FetchOutcome::Superseded);
        assert_eq!(folder_outcome, FetchOutcome::Loaded { page: 1 });
        assert_eq!(ids(&controller.snapshot()), vec![30]);
    }

    #[tokio::test]
    async fn next_page_is_skipped_while_in_flight() {
        let client = GatedClient::default();
        let controller = controller();
        let gate = client.gate();

        let (first_outcome, next_outcome) = futures::join!(
            controller.set_params(&client, params(0)),
            async {
                assert!(controller.is_loading());
                let outcome = controller.load_next_page(&client).await;
                gate.send(Response::Collection(collection_page(&[1, 2], 1, 2, 4)))
                    .unwrap();
                outcome
            }
        );

        assert_eq!(first_outcome, FetchOutcome::Loaded { page: 1 });
        assert_eq!(next_outcome, FetchOutcome::Skipped(SkipReason::InFlight));
        assert_eq!(ids(&controller.snapshot()), vec![1, 2]);
    }

    #[tokio::test]
    async fn loading_clears_previous_error() {
        let client = GatedClient::default();
        let controller = controller();
        client
            .gate()
            .send(error_response(500, "boom"))
            .unwrap();
        controller.set_params(&client, params(0)).await;
        assert!(controller.snapshot().error.is_some());

        let gate = client.gate();
        futures::join!(controller.refresh(&client), async {
            let state = controller.snapshot();
            assert!(state.is_loading());
            assert!(state.error.is_none());
            gate.send(Response::Collection(collection_page(&[1], 1, 1, 1)))
                .unwrap();
        });
        assert_eq!(controller.snapshot().status, FetchStatus::Ready);
    }

    #[tokio::test]
    async fn items_beyond_reported_total_are_truncated() {
        let client = MockClient::default();
        client.push_collection_response(collection_page(&[1, 2], 1, 2, 3));
        client.push_collection_response(collection_page(&[3, 4], 2, 2, 3));

        let controller = controller();
        controller.set_params(&client, params(0)).await;
        controller.load_next_page(&client).await;

        assert_eq!(ids(&controller.snapshot()), vec![1, 2, 3]);
    }
}
