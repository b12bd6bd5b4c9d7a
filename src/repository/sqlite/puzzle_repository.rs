//! Puzzle rows and the ingestion of a whole scrape result.
//!
//! Ingestion runs in one transaction: either every entry lands or none do.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::{map_leaderboard_status, submission_repository, user_repository};
use crate::domain::models::{LeaderboardStatus, PuzzleEntry, PuzzleMonth};
use crate::repository::PuzzleSink;

/// Counts from one ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub puzzles: usize,
    pub submissions: u64,
    /// Entries whose date text is not a month.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPuzzle {
    pub id: i64,
    pub month: PuzzleMonth,
    pub date_text: String,
    pub name: String,
    pub solution_url: Option<String>,
    pub leaderboard_id: Option<String>,
    pub leaderboard: LeaderboardStatus,
}

pub struct PuzzleRepository {
    pool: SqlitePool,
}

impl PuzzleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upserts every entry with its solvers.
    ///
    /// An `Available` entry replaces the puzzle's submissions with its current
    /// solver list. Other statuses, `FetchFailed` included, leave stored
    /// submissions untouched.
    pub async fn ingest(&self, entries: &[PuzzleEntry]) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin ingest transaction")?;

        for entry in entries {
            let Some(month) = entry.month() else {
                log::warn!("[INGEST] Skipping {}: date is not a month", entry.key());
                summary.skipped += 1;
                continue;
            };

            let puzzle_id = upsert(&mut *tx, entry, month).await?;
            summary.puzzles += 1;

            if entry.leaderboard != LeaderboardStatus::Available {
                continue;
            }

            submission_repository::clear_for_puzzle(&mut *tx, puzzle_id).await?;
            for solver in entry.solver_names() {
                let user_id = user_repository::upsert(&mut *tx, &solver).await?;
                summary.submissions +=
                    submission_repository::insert(&mut *tx, puzzle_id, user_id).await?;
            }
        }

        tx.commit()
            .await
            .context("Failed to commit ingest transaction")?;

        log::info!(
            "[INGEST] Stored {} puzzles with {} submissions ({} skipped)",
            summary.puzzles,
            summary.submissions,
            summary.skipped
        );
        Ok(summary)
    }

    pub async fn get_by_key(&self, month: PuzzleMonth, name: &str) -> Result<Option<StoredPuzzle>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, date_text, name, solution_url, data_directory, leaderboard_status
            FROM puzzles
            WHERE date = ? AND name = ?
            "#,
        )
        .bind(month.first_day())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch puzzle")?;

        Ok(row.map(|row| StoredPuzzle {
            id: row.get("id"),
            month: PuzzleMonth::from_date(row.get("date")),
            date_text: row.get("date_text"),
            name: row.get("name"),
            solution_url: row.get("solution_url"),
            leaderboard_id: row.get("data_directory"),
            leaderboard: map_leaderboard_status(row.get::<&str, _>("leaderboard_status")),
        }))
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM puzzles")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count puzzles")
    }
}

#[async_trait]
impl PuzzleSink for PuzzleRepository {
    async fn store(&self, entries: &[PuzzleEntry]) -> Result<()> {
        self.ingest(entries).await.map(|_| ())
    }
}

/// Rows are keyed by month, not by listing text, so two spellings of one month
/// share a row and the later spelling wins `date_text`.
async fn upsert(conn: &mut SqliteConnection, entry: &PuzzleEntry, month: PuzzleMonth) -> Result<i64> {
    sqlx::query_scalar(
        r#"
        INSERT INTO puzzles (date, name, date_text, solution_url, data_directory, leaderboard_status)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(date, name) DO UPDATE SET
            date_text = excluded.date_text,
            solution_url = excluded.solution_url,
            data_directory = excluded.data_directory,
            leaderboard_status = excluded.leaderboard_status,
            updated_at = CURRENT_TIMESTAMP
        RETURNING id
        "#,
    )
    .bind(month.first_day())
    .bind(&entry.name)
    .bind(&entry.date_text)
    .bind(&entry.solution_url)
    .bind(&entry.leaderboard_id)
    .bind(entry.leaderboard.as_str())
    .fetch_one(conn)
    .await
    .context(format!("Failed to upsert puzzle {}", entry.key()))
}
