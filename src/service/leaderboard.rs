//! Leaderboard JSON retrieval.

use serde::Deserialize;
use std::sync::Arc;

use crate::domain::models::SolverName;
use crate::domain::ArchiveEndpoints;
use crate::error::{FetchError, FetchResult};
use crate::extractor::solver_name;
use crate::service::http::ArchiveClient;

#[derive(Debug, Deserialize)]
struct LeaderboardPayload {
    leaders: Option<Vec<String>>,
}

pub struct LeaderboardFetcher {
    client: Arc<dyn ArchiveClient>,
    endpoints: ArchiveEndpoints,
}

impl LeaderboardFetcher {
    pub fn new(client: Arc<dyn ArchiveClient>, endpoints: ArchiveEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Solvers for `leaderboard_id` in leaderboard order.
    pub async fn fetch(&self, leaderboard_id: &str) -> FetchResult<Vec<SolverName>> {
        let url = self
            .endpoints
            .leaderboard_url(leaderboard_id)
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let body = self.client.get_text(&url).await?;
        let payload: LeaderboardPayload = serde_json::from_str(&body)?;
        let leaders = payload.leaders.ok_or(FetchError::MissingField("leaders"))?;

        Ok(leaders
            .iter()
            .map(|raw| solver_name::split(raw))
            .filter(|name| !name.normalized.is_empty())
            .collect())
    }
}
