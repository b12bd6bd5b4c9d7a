use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::PuzzleEntry;

pub mod json_store;
pub mod sqlite;

pub use json_store::JsonSnapshotStore;

/// Destination for the entries produced by one scrape run.
#[async_trait]
pub trait PuzzleSink: Send + Sync {
    async fn store(&self, entries: &[PuzzleEntry]) -> Result<()>;
}
