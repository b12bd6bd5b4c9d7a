//! Reporting queries over ingested submissions.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::domain::models::{FrequencyBucket, SolverTally};

pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn unique_users(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM submissions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count unique users")
    }

    /// Users with the most submissions, ties broken by name.
    pub async fn top_users(&self, limit: i64) -> Result<Vec<SolverTally>> {
        let rows = sqlx::query(
            r#"
            SELECT u.original_name AS name, COUNT(s.id) AS submissions
            FROM users u
            JOIN submissions s ON s.user_id = u.id
            GROUP BY u.id
            ORDER BY submissions DESC, u.normalized_name ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch top users")?;

        Ok(rows
            .into_iter()
            .map(|row| SolverTally {
                name: row.get("name"),
                submissions: row.get("submissions"),
            })
            .collect())
    }

    /// How many users have each submission count, lowest count first.
    pub async fn submission_distribution(&self) -> Result<Vec<FrequencyBucket>> {
        let rows = sqlx::query(
            r#"
            SELECT per_user.submissions AS submissions, COUNT(*) AS users
            FROM (
                SELECT user_id, COUNT(*) AS submissions
                FROM submissions
                GROUP BY user_id
            ) per_user
            GROUP BY per_user.submissions
            ORDER BY per_user.submissions ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch submission distribution")?;

        Ok(rows
            .into_iter()
            .map(|row| FrequencyBucket {
                submissions: row.get("submissions"),
                solvers: row.get("users"),
            })
            .collect())
    }
}
