use anyhow::Result;
use bpaf::Bpaf;
use heap_rust_sdk::models::fetch::FetchController;
use heap_rust_sdk::models::resources::{Folders as FoldersKind, UserParams};
use heap_rust_sdk::providers::catalog::Client;
use tracing::instrument;

use super::fetch_error;
use crate::utils::display::DisplayFolders;
use crate::utils::{message, print_json};

// List the folders of a collection
#[derive(Debug, Bpaf, Clone)]
pub struct Folders {
    /// Display folders as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// Whose folders to list (default: the configured username)
    #[bpaf(long, short, argument("USER"))]
    pub user: Option<String>,
}

impl Folders {
    #[instrument(name = "folders", skip_all)]
    pub async fn handle(self, client: &Client) -> Result<()> {
        let folders = FetchController::<FoldersKind>::default();
        folders.set_params(client, UserParams::new(self.user)).await;

        let state = folders.snapshot();
        if let Some(err) = fetch_error(&state, "folders") {
            return Err(err);
        }

        if self.json {
            print_json(&state.items)?;
        } else if state.items.is_empty() {
            message::plain("No folders found");
        } else {
            print!("{}", DisplayFolders(&state.items));
        }
        Ok(())
    }
}
