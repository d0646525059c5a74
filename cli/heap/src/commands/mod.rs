mod collection;
mod folders;
mod release;
mod search;
mod wantlist;

use std::num::NonZeroU32;

use anyhow::Result;
use bpaf::Bpaf;
use heap_rust_sdk::models::fetch::FetchState;
use heap_rust_sdk::providers::catalog::Client;
use indoc::indoc;

use crate::config::Config;
use crate::utils::display::{DisplayRecords, RecordSummary};
use crate::utils::init::init_catalog_client;
use crate::utils::{message, print_json};

static HEAP_DESCRIPTION: &'_ str = indoc! {"
    Heap browses a record collection and wantlist kept in the online catalog.\n\n

    Lists are loaded page by page, use '--pages' or '--all' to load more than the first."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, version, descr(HEAP_DESCRIPTION))]
pub struct HeapCli(#[bpaf(external(heap_args))] pub HeapArgs);

/// Main heap args parser
///
/// To parse the heap CLI, use [`HeapCli`] instead using [`heap_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct HeapArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands))]
    command: Commands,
}

impl HeapArgs {
    /// Create the catalog client and run the selected command with it
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = init_catalog_client(&config)?;

        match self.command {
            Commands::Collection(args) => args.handle(&config, &client).await,
            Commands::Folders(args) => args.handle(&client).await,
            Commands::Wantlist(args) => args.handle(&config, &client).await,
            Commands::Release(args) => args.handle(&client).await,
            Commands::Search(args) => args.handle(&config, &client).await,
        }
    }
}

#[derive(Debug, Bpaf, Clone)]
enum Commands {
    /// List the releases in a collection
    #[bpaf(command)]
    Collection(#[bpaf(external(collection::collection))] collection::Collection),

    /// List the folders of a collection
    #[bpaf(command)]
    Folders(#[bpaf(external(folders::folders))] folders::Folders),

    /// List, search and sort a wantlist
    #[bpaf(command)]
    Wantlist(#[bpaf(external(wantlist::wantlist))] wantlist::Wantlist),

    /// Show the details of a release
    #[bpaf(command)]
    Release(#[bpaf(external(release::release))] release::Release),

    /// Search the release database
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),
}

/// How many pages of a list to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Bpaf)]
pub enum PageLimit {
    /// Load every page
    #[bpaf(long)]
    All,
    Pages(
        /// Number of pages to load (default: 1)
        #[bpaf(long("pages"), argument("N"))]
        NonZeroU32,
    ),
}

impl Default for PageLimit {
    fn default() -> Self {
        PageLimit::Pages(NonZeroU32::MIN)
    }
}

impl PageLimit {
    /// Whether to load another page after `loaded` pages.
    fn wants_more(&self, loaded: u32) -> bool {
        match self {
            PageLimit::All => true,
            PageLimit::Pages(limit) => loaded < limit.get(),
        }
    }
}

/// Resolve the page size from the command line or config.
fn per_page(arg: Option<NonZeroU32>, config: &Config) -> Result<NonZeroU32> {
    match arg {
        Some(per_page) => Ok(per_page),
        None => config.heap.per_page(),
    }
}

/// Convert the error stored by a failed fetch.
fn fetch_error<T>(state: &FetchState<T>, what: &str) -> Option<anyhow::Error> {
    state
        .error
        .clone()
        .map(|err| anyhow::Error::new(err).context(format!("Failed to load {what}")))
}

/// Print the records loaded into `state`.
///
/// Records loaded before a failed page are still printed,
/// the failure is returned afterwards.
fn print_records<T>(
    state: &FetchState<T>,
    records: &[RecordSummary],
    json: bool,
    what: &str,
) -> Result<()> {
    if records.is_empty() {
        if let Some(err) = fetch_error(state, what) {
            return Err(err);
        }
    }

    if json {
        print_json(&records)?;
    } else if records.is_empty() {
        message::plain(format!("No {what} found"));
    } else {
        print!("{}", DisplayRecords(records));
    }

    if let Some(pagination) = state.pagination.as_ref().filter(|_| state.has_more()) {
        message::plain(format!(
            "Loaded {} of {} {what}, use '--pages <N>' or '--all' to load more",
            state.items.len(),
            pagination.items
        ));
    }

    match fetch_error(state, what) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
