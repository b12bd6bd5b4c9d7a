use anyhow::{Context, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::domain::models::{SolverName, SolverRecord};

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_normalized_name(&self, normalized: &str) -> Result<Option<SolverRecord>> {
        let row = sqlx::query(
            "SELECT id, original_name, normalized_name FROM users WHERE normalized_name = ?",
        )
        .bind(normalized)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(row.map(|row| SolverRecord {
            id: row.get("id"),
            original_name: row.get("original_name"),
            normalized_name: row.get("normalized_name"),
        }))
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")
    }
}

/// Returns the id of the user keyed by `solver.normalized`, creating it on
/// first sight. An existing user keeps the display name it was created with.
pub(super) async fn upsert(conn: &mut SqliteConnection, solver: &SolverName) -> Result<i64> {
    sqlx::query(
        "INSERT INTO users (original_name, normalized_name) VALUES (?, ?) ON CONFLICT(normalized_name) DO NOTHING",
    )
    .bind(&solver.display)
    .bind(&solver.normalized)
    .execute(&mut *conn)
    .await
    .context(format!("Failed to insert user {}", solver.normalized))?;

    sqlx::query_scalar("SELECT id FROM users WHERE normalized_name = ?")
        .bind(&solver.normalized)
        .fetch_one(&mut *conn)
        .await
        .context(format!("Failed to look up user {}", solver.normalized))
}
