use crate::domain::models::LeaderboardStatus;

mod puzzle_repository;
mod stats_repository;
mod submission_repository;
mod user_repository;

pub use puzzle_repository::{IngestSummary, PuzzleRepository, StoredPuzzle};
pub use stats_repository::StatsRepository;
pub use submission_repository::SubmissionRepository;
pub use user_repository::UserRepository;

pub fn map_leaderboard_status(s: &str) -> LeaderboardStatus {
    match s {
        "available" => LeaderboardStatus::Available,
        "pre_cutoff" => LeaderboardStatus::PreCutoff,
        "no_metadata" => LeaderboardStatus::NoMetadata,
        "fetch_failed" => LeaderboardStatus::FetchFailed,
        _ => LeaderboardStatus::Open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{PuzzleMonth, SubmissionRecord};
    use crate::repository::PuzzleSink;
    use crate::test_utils::fixtures;

    #[test]
    fn test_status_round_trips_through_column_text() {
        for status in [
            LeaderboardStatus::Open,
            LeaderboardStatus::Available,
            LeaderboardStatus::PreCutoff,
            LeaderboardStatus::NoMetadata,
            LeaderboardStatus::FetchFailed,
        ] {
            assert_eq!(map_leaderboard_status(status.as_str()), status);
        }
        assert_eq!(map_leaderboard_status("garbage"), LeaderboardStatus::Open);
    }

    #[tokio::test]
    async fn test_ingest_links_puzzles_users_and_submissions() {
        let pool = fixtures::setup_test_db().await;
        let puzzles = PuzzleRepository::new(pool.clone());
        let users = UserRepository::new(pool.clone());
        let submissions = SubmissionRepository::new(pool.clone());

        let entries = vec![
            fixtures::open("March 2024", "Open Puzzle"),
            fixtures::solved("February 2024", "Beta", &["Jane Doe (NYC)", "Bob"]),
            fixtures::solved("January 2024", "Alpha", &["jane doe", "Carol"]),
        ];
        let summary = puzzles.ingest(&entries).await.expect("ingest failed");

        assert_eq!(summary.puzzles, 3);
        assert_eq!(summary.submissions, 4);
        assert_eq!(summary.skipped, 0);
        assert_eq!(users.count().await.unwrap(), 3);

        // first spelling seen is kept as the display name
        let jane = users.get_by_normalized_name("jane doe").await.unwrap().unwrap();
        assert_eq!(jane.original_name, "Jane Doe");

        let beta = puzzles
            .get_by_key(PuzzleMonth::new(2024, 2).unwrap(), "Beta")
            .await
            .unwrap()
            .expect("Beta stored");
        assert_eq!(beta.leaderboard, LeaderboardStatus::Available);
        assert_eq!(beta.leaderboard_id.as_deref(), Some("beta"));
        assert_eq!(beta.date_text, "February 2024");

        let linked = submissions.for_puzzle(beta.id).await.unwrap();
        assert_eq!(linked.len(), 2);
        assert!(linked.contains(&SubmissionRecord {
            puzzle_id: beta.id,
            user_id: jane.id
        }));
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent() {
        let pool = fixtures::setup_test_db().await;
        let puzzles = PuzzleRepository::new(pool.clone());
        let entries = vec![fixtures::solved("May 2023", "Repeat", &["Ann", "Bo"])];

        puzzles.ingest(&entries).await.unwrap();
        puzzles.ingest(&entries).await.unwrap();

        assert_eq!(puzzles.count().await.unwrap(), 1);
        assert_eq!(UserRepository::new(pool.clone()).count().await.unwrap(), 2);
        assert_eq!(SubmissionRepository::new(pool).count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_refetched_leaderboard_supersedes_submissions() {
        let pool = fixtures::setup_test_db().await;
        let puzzles = PuzzleRepository::new(pool.clone());
        let submissions = SubmissionRepository::new(pool.clone());

        puzzles
            .ingest(&[fixtures::solved("May 2023", "Shifting", &["Ann", "Bo"])])
            .await
            .unwrap();
        puzzles
            .ingest(&[fixtures::solved("May 2023", "Shifting", &["Bo", "Cy"])])
            .await
            .unwrap();

        let stored = puzzles
            .get_by_key(PuzzleMonth::new(2023, 5).unwrap(), "Shifting")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submissions.for_puzzle(stored.id).await.unwrap().len(), 2);
        assert_eq!(submissions.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_leaderboard_keeps_existing_submissions() {
        let pool = fixtures::setup_test_db().await;
        let puzzles = PuzzleRepository::new(pool.clone());

        puzzles
            .ingest(&[fixtures::solved("May 2023", "Flaky", &["Ann"])])
            .await
            .unwrap();
        let mut degraded = fixtures::solved("May 2023", "Flaky", &[]);
        degraded.leaderboard = LeaderboardStatus::NoMetadata;
        puzzles.ingest(&[degraded]).await.unwrap();

        assert_eq!(SubmissionRepository::new(pool).count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_leaderboard_fetch_keeps_existing_submissions() {
        use crate::domain::models::ArchiveRow;
        use crate::domain::ArchiveEndpoints;
        use crate::service::{LeaderboardFetcher, PuzzleResolver};
        use crate::test_utils::mocks::{solution_page, StubClient};
        use std::sync::Arc;
        use url::Url;

        let pool = fixtures::setup_test_db().await;
        let puzzles = PuzzleRepository::new(pool.clone());
        puzzles
            .ingest(&[fixtures::solved("May 2023", "Flaky", &["Ann", "Bo"])])
            .await
            .unwrap();

        let solution = "https://www.janestreet.com/puzzles/flaky-solution/";
        let client = Arc::new(
            StubClient::new()
                .with_body(solution, solution_page(Some("flaky")))
                .with_status("https://www.janestreet.com/puzzles/flaky-leaderboard.json", 503),
        );
        let leaderboards = LeaderboardFetcher::new(client.clone(), ArchiveEndpoints::default());
        let resolver = PuzzleResolver::new(client, leaderboards);
        let row = ArchiveRow {
            date_text: "May 2023".into(),
            month: PuzzleMonth::new(2023, 5).unwrap(),
            name: "Flaky".into(),
            solution_url: Some(Url::parse(solution).unwrap()),
        };

        let refreshed = resolver.resolve(&row).await;
        assert_eq!(refreshed.leaderboard, LeaderboardStatus::FetchFailed);
        puzzles.ingest(&[refreshed]).await.unwrap();

        let stored = puzzles
            .get_by_key(PuzzleMonth::new(2023, 5).unwrap(), "Flaky")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.leaderboard, LeaderboardStatus::FetchFailed);
        assert_eq!(SubmissionRepository::new(pool).count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_date_is_skipped() {
        let pool = fixtures::setup_test_db().await;
        let puzzles = PuzzleRepository::new(pool.clone());

        let summary = puzzles
            .ingest(&[
                fixtures::open("Someday", "Undated"),
                fixtures::open("June 2024", "Dated"),
            ])
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(puzzles.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_month_spellings_share_a_row() {
        let pool = fixtures::setup_test_db().await;
        let puzzles = PuzzleRepository::new(pool.clone());

        puzzles
            .ingest(&[
                fixtures::solved("Nov 2015", "Short", &["Ann"]),
                fixtures::solved("November 2015", "Short", &["Ann", "Bo"]),
            ])
            .await
            .unwrap();

        assert_eq!(puzzles.count().await.unwrap(), 1);
        let stored = puzzles
            .get_by_key(PuzzleMonth::new(2015, 11).unwrap(), "Short")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.date_text, "November 2015");
        assert_eq!(SubmissionRepository::new(pool).count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_repository_works_as_sink() {
        let pool = fixtures::setup_test_db().await;
        let sink: Box<dyn PuzzleSink> = Box::new(PuzzleRepository::new(pool.clone()));

        sink.store(&[fixtures::solved("May 2023", "Sunk", &["Ann"])])
            .await
            .unwrap();

        assert_eq!(SubmissionRepository::new(pool).count().await.unwrap(), 1);
    }
}
