use crate::domain::GameDraft;
use crate::error::Result;
use crate::infrastructure::{RawgClient, RawgGameBasic};
use tracing::{info, warn};

/// Metadata-assisted add flow on top of the RAWG client.
pub struct LookupService {
    rawg_client: RawgClient,
}

impl LookupService {
    pub fn new(rawg_client: RawgClient) -> Self {
        Self { rawg_client }
    }

    pub async fn search(&self, query: &str, api_key: &str) -> Result<Vec<RawgGameBasic>> {
        self.rawg_client.search(query, api_key).await
    }

    /// Builds a draft for a chosen search result. Falls back to the summary
    /// when the detail lookup fails or yields nothing.
    pub async fn draft_for(&self, summary: &RawgGameBasic, api_key: &str) -> GameDraft {
        match self.rawg_client.fetch_detail(summary.id, api_key).await {
            Ok(Some(detail)) => {
                info!("Using RAWG details for '{}'", detail.name);
                detail.to_game_draft()
            }
            Ok(None) => summary.to_game_draft(),
            Err(e) => {
                warn!(
                    "Could not fetch details for '{}', using search result: {}",
                    summary.name, e
                );
                summary.to_game_draft()
            }
        }
    }
}
