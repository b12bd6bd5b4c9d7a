use anyhow::{Context, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::domain::models::SubmissionRecord;

pub struct SubmissionRepository {
    pool: SqlitePool,
}

impl SubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn for_puzzle(&self, puzzle_id: i64) -> Result<Vec<SubmissionRecord>> {
        let rows = sqlx::query("SELECT puzzle_id, user_id FROM submissions WHERE puzzle_id = ? ORDER BY id")
            .bind(puzzle_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch submissions for puzzle")?;

        Ok(rows
            .into_iter()
            .map(|row| SubmissionRecord {
                puzzle_id: row.get("puzzle_id"),
                user_id: row.get("user_id"),
            })
            .collect())
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count submissions")
    }
}

pub(super) async fn clear_for_puzzle(conn: &mut SqliteConnection, puzzle_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM submissions WHERE puzzle_id = ?")
        .bind(puzzle_id)
        .execute(conn)
        .await
        .context("Failed to clear submissions")?;
    Ok(())
}

/// Links a user to a puzzle. Returns 0 when the link already exists.
pub(super) async fn insert(conn: &mut SqliteConnection, puzzle_id: i64, user_id: i64) -> Result<u64> {
    let result = sqlx::query("INSERT OR IGNORE INTO submissions (puzzle_id, user_id) VALUES (?, ?)")
        .bind(puzzle_id)
        .bind(user_id)
        .execute(conn)
        .await
        .context("Failed to insert submission")?;
    Ok(result.rows_affected())
}
