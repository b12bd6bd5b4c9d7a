//! The JSON snapshot: an ordered array of puzzle entries.
//!
//! The snapshot written by one run is the prior state of the next. Loading
//! never fails the run; an unreadable snapshot only costs a full re-fetch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::PuzzleSink;
use crate::domain::models::PuzzleEntry;
use crate::service::pipeline::PriorIndex;

pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot, falling back to an empty list when the file is
    /// missing or cannot be parsed.
    pub async fn load(&self) -> Vec<PuzzleEntry> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "[SNAPSHOT] No snapshot at {}, starting fresh",
                    self.path.display()
                );
                return Vec::new();
            }
            Err(e) => {
                log::warn!(
                    "[SNAPSHOT] Cannot read {}: {}. Starting fresh",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<PuzzleEntry>>(&raw) {
            Ok(entries) => {
                log::info!(
                    "[SNAPSHOT] Loaded {} entries from {}",
                    entries.len(),
                    self.path.display()
                );
                entries
            }
            Err(e) => {
                log::warn!(
                    "[SNAPSHOT] Corrupt snapshot {}: {}. Starting fresh",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    pub async fn load_index(&self) -> PriorIndex {
        PriorIndex::new(self.load().await)
    }

    /// Replaces the snapshot. The new file is written beside the old one and
    /// renamed over it, so a crash never leaves a truncated snapshot.
    pub async fn save(&self, entries: &[PuzzleEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_string_pretty(entries).context("Failed to encode snapshot")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .context(format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context(format!("Failed to replace {}", self.path.display()))?;

        log::info!(
            "[SNAPSHOT] Saved {} entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl PuzzleSink for JsonSnapshotStore {
    async fn store(&self, entries: &[PuzzleEntry]) -> Result<()> {
        self.save(entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{LeaderboardStatus, PuzzleKey};
    use crate::test_utils::fixtures;

    #[tokio::test]
    async fn test_missing_file_is_empty_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("absent.json"));

        assert!(store.load().await.is_empty());
        assert!(store.load_index().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puzzles.json");
        std::fs::write(&path, "[{\"date_text\": \"May 2020\", ").unwrap();

        let store = JsonSnapshotStore::new(&path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("out").join("puzzles.json"));
        let entries = vec![
            fixtures::open("June 2024", "Newest"),
            fixtures::solved("May 2024", "Middle", &["Ann", "Bo (Oslo)"]),
            fixtures::solved("April 2024", "Oldest", &[]),
        ];

        store.save(&entries).await.unwrap();
        let loaded = store.load().await;

        assert_eq!(loaded, entries);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("puzzles.json"));

        store.store(&[fixtures::open("June 2024", "A")]).await.unwrap();
        store.store(&[fixtures::open("July 2024", "B")]).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "B");
    }

    #[tokio::test]
    async fn test_legacy_placeholders_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"[
                {"date_text": "October 2015", "name": "Old One",
                 "solution_url": "https://www.janestreet.com/puzzles/old-one-solution/",
                 "data_directory": "old-one",
                 "solvers": "No leaderboard available (pre-November 2015)"},
                {"date_text": "July 2024", "name": "Open One",
                 "solution_url": "Solution not available yet",
                 "solvers": []}
            ]"#,
        )
        .unwrap();

        let index = JsonSnapshotStore::new(&path).load_index().await;
        assert_eq!(index.len(), 2);

        let old = index.get(&PuzzleKey::new("October 2015", "Old One")).unwrap();
        assert_eq!(old.leaderboard_id.as_deref(), Some("old-one"));
        assert!(old.solvers.is_empty());

        let open = index.get(&PuzzleKey::new("July 2024", "Open One")).unwrap();
        assert!(open.is_open());
        assert_eq!(open.leaderboard, LeaderboardStatus::Open);
    }
}
