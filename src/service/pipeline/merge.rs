//! Reconciles freshly parsed rows with the previous run's entries.

use std::collections::HashMap;

use crate::domain::models::{ArchiveRow, PuzzleEntry, PuzzleKey};

/// Read-only lookup of the previous run's entries by natural key.
#[derive(Debug, Default, Clone)]
pub struct PriorIndex {
    by_key: HashMap<PuzzleKey, PuzzleEntry>,
}

impl PriorIndex {
    pub fn new(entries: impl IntoIterator<Item = PuzzleEntry>) -> Self {
        let mut by_key = HashMap::new();
        for entry in entries {
            // first occurrence wins, matching how a run emits entries
            by_key.entry(entry.key()).or_insert(entry);
        }
        Self { by_key }
    }

    pub fn get(&self, key: &PuzzleKey) -> Option<&PuzzleEntry> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// What to do with one parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDecision {
    /// Row needs its solution page and leaderboard fetched.
    Resolve(ArchiveRow),
    /// Row is settled without any network request.
    Reuse(PuzzleEntry),
}

pub fn plan(row: ArchiveRow, prior: &PriorIndex, force_refresh: bool) -> MergeDecision {
    if row.solution_url.is_some() {
        return MergeDecision::Resolve(row);
    }

    if !force_refresh {
        if let Some(previous) = prior.get(&row.key()) {
            log::trace!("[MERGE] Reusing cached entry for {}", row.key());
            return MergeDecision::Reuse(previous.clone());
        }
    }

    MergeDecision::Reuse(PuzzleEntry::open(&row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{LeaderboardStatus, PuzzleMonth};
    use url::Url;

    fn row(name: &str, solution: Option<&str>) -> ArchiveRow {
        ArchiveRow {
            date_text: "March 2024".into(),
            month: PuzzleMonth::new(2024, 3).unwrap(),
            name: name.into(),
            solution_url: solution.map(|s| Url::parse(s).unwrap()),
        }
    }

    fn prior_open(name: &str) -> PuzzleEntry {
        PuzzleEntry {
            date_text: "March 2024".into(),
            name: name.into(),
            solution_url: None,
            leaderboard_id: None,
            leaderboard: LeaderboardStatus::Open,
            solvers: vec![],
        }
    }

    #[test]
    fn test_unsolved_row_reuses_prior_verbatim() {
        let mut previous = prior_open("Current");
        previous.leaderboard_id = Some("kept-as-is".into());
        let prior = PriorIndex::new([previous.clone()]);

        let decision = plan(row("Current", None), &prior, false);
        assert_eq!(decision, MergeDecision::Reuse(previous));
    }

    #[test]
    fn test_solved_row_always_resolves() {
        let prior = PriorIndex::new([prior_open("Current")]);
        let solved = row("Current", Some("https://example.com/current-solution/"));

        assert_eq!(
            plan(solved.clone(), &prior, false),
            MergeDecision::Resolve(solved)
        );
    }

    #[test]
    fn test_unknown_unsolved_row_gets_fresh_entry() {
        let decision = plan(row("Brand new", None), &PriorIndex::default(), false);
        let MergeDecision::Reuse(entry) = decision else {
            panic!("expected a settled entry");
        };
        assert_eq!(entry.leaderboard, LeaderboardStatus::Open);
        assert!(entry.solvers.is_empty());
        assert!(entry.solution_url.is_none());
    }

    #[test]
    fn test_force_refresh_ignores_prior() {
        let mut previous = prior_open("Current");
        previous.solvers = vec!["stale".into()];
        let prior = PriorIndex::new([previous]);

        let MergeDecision::Reuse(entry) = plan(row("Current", None), &prior, true) else {
            panic!("expected a settled entry");
        };
        assert!(entry.solvers.is_empty());
    }

    #[test]
    fn test_retitled_puzzle_is_a_new_key() {
        let mut previous = prior_open("Old title");
        previous.leaderboard_id = Some("marker".into());
        let prior = PriorIndex::new([previous]);

        let MergeDecision::Reuse(entry) = plan(row("New title", None), &prior, false) else {
            panic!("expected a settled entry");
        };
        assert_eq!(entry.name, "New title");
        assert_eq!(entry.leaderboard_id, None);
    }

    #[test]
    fn test_prior_index_keeps_first_duplicate() {
        let mut first = prior_open("Dup");
        first.leaderboard_id = Some("first".into());
        let mut second = prior_open("Dup");
        second.leaderboard_id = Some("second".into());

        let prior = PriorIndex::new([first, second]);
        assert_eq!(prior.len(), 1);
        let key = PuzzleKey::new("March 2024", "Dup");
        assert_eq!(prior.get(&key).unwrap().leaderboard_id.as_deref(), Some("first"));
    }
}
