//! Turns a solved listing row into a complete entry.

use std::sync::Arc;

use crate::domain::models::{
    ArchiveRow, LeaderboardStatus, PuzzleEntry, PuzzleMonth, LEADERBOARD_CUTOFF,
};
use crate::extractor::SolutionPageExtractor;
use crate::service::http::ArchiveClient;
use crate::service::leaderboard::LeaderboardFetcher;

pub struct PuzzleResolver {
    client: Arc<dyn ArchiveClient>,
    leaderboards: LeaderboardFetcher,
    cutoff: PuzzleMonth,
}

impl PuzzleResolver {
    pub fn new(client: Arc<dyn ArchiveClient>, leaderboards: LeaderboardFetcher) -> Self {
        Self {
            client,
            leaderboards,
            cutoff: LEADERBOARD_CUTOFF,
        }
    }

    /// Resolves the row's leaderboard. Never fails; problems are logged and
    /// recorded as a status with no solvers. Only a successful leaderboard
    /// fetch yields `Available`.
    pub async fn resolve(&self, row: &ArchiveRow) -> PuzzleEntry {
        let Some(solution_url) = row.solution_url.as_ref() else {
            return PuzzleEntry::open(row);
        };

        let leaderboard_id = match self.client.get_text(solution_url).await {
            Ok(html) => SolutionPageExtractor::extract_leaderboard_id(&html),
            Err(e) => {
                log::warn!("[RESOLVE] {}: solution page {} failed: {}", row.key(), solution_url, e);
                None
            }
        };

        let Some(leaderboard_id) = leaderboard_id else {
            log::debug!("[RESOLVE] {}: no leaderboard identifier", row.key());
            return PuzzleEntry::without_leaderboard(row, LeaderboardStatus::NoMetadata, None);
        };

        if row.month < self.cutoff {
            log::debug!("[RESOLVE] {}: before {}, leaderboard not published", row.key(), self.cutoff);
            return PuzzleEntry::without_leaderboard(
                row,
                LeaderboardStatus::PreCutoff,
                Some(leaderboard_id),
            );
        }

        match self.leaderboards.fetch(&leaderboard_id).await {
            Ok(solvers) => {
                log::debug!("[LEADERBOARD] {}: {} solvers", leaderboard_id, solvers.len());
                PuzzleEntry::with_solvers(row, leaderboard_id, solvers)
            }
            Err(e) => {
                log::warn!("[LEADERBOARD] {}: {}; solvers unknown", leaderboard_id, e);
                PuzzleEntry::without_leaderboard(
                    row,
                    LeaderboardStatus::FetchFailed,
                    Some(leaderboard_id),
                )
            }
        }
    }
}
