use anyhow::{Result, anyhow};
use bpaf::Bpaf;
use heap_rust_sdk::models::fetch::FetchController;
use heap_rust_sdk::models::resources::Release as ReleaseKind;
use heap_rust_sdk::providers::catalog::{Client, ReleaseId};
use tracing::instrument;

use super::fetch_error;
use crate::utils::display::DisplayRelease;
use crate::utils::print_json;

// Show the details of a release
#[derive(Debug, Bpaf, Clone)]
pub struct Release {
    /// Display the release as JSON
    #[bpaf(long)]
    pub json: bool,

    /// The release to show
    #[bpaf(positional("RELEASE-ID"))]
    pub release_id: ReleaseId,
}

impl Release {
    #[instrument(name = "release", fields(release_id = %self.release_id), skip_all)]
    pub async fn handle(self, client: &Client) -> Result<()> {
        let release = FetchController::<ReleaseKind>::default();
        release.set_params(client, self.release_id).await;

        let state = release.snapshot();
        if let Some(err) = fetch_error(&state, &format!("release {}", self.release_id)) {
            return Err(err);
        }
        let details = state
            .items
            .first()
            .ok_or_else(|| anyhow!("Release {} not found", self.release_id))?;

        if self.json {
            print_json(details)?;
        } else {
            print!("{}", DisplayRelease(details));
        }
        Ok(())
    }
}
