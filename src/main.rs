use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use puzzle_leaderboard::db;
use puzzle_leaderboard::domain::endpoints::DEFAULT_SITE_ROOT;
use puzzle_leaderboard::domain::models::PuzzleMonth;
use puzzle_leaderboard::domain::ArchiveEndpoints;
use puzzle_leaderboard::lifecycle;
use puzzle_leaderboard::repository::sqlite::{PuzzleRepository, StatsRepository};
use puzzle_leaderboard::service::stats::{LeaderboardStats, PARTICIPATION_WINDOW_MONTHS};
use puzzle_leaderboard::service::HttpArchiveClient;
use puzzle_leaderboard::{ArchiveScraper, JsonSnapshotStore, PuzzleSink, ScrapeSettings};

#[derive(Parser)]
#[command(name = "puzzle-leaderboard")]
#[command(about = "Scrape the puzzle archive and its leaderboards")]
#[command(after_help = "\x1b[36mExamples:\x1b[0m
  puzzle-leaderboard scrape                      # Refresh puzzles.json
  puzzle-leaderboard scrape --db puzzles.db      # ...and load it into SQLite
  puzzle-leaderboard stats --top 20              # Report on puzzles.json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the archive and write the JSON snapshot
    Scrape {
        /// Stop after this many listing pages (default: until an empty page)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_pages: Option<u32>,

        /// Snapshot to read prior state from and overwrite
        #[arg(short, long, default_value = "puzzles.json")]
        output: PathBuf,

        /// Re-resolve every puzzle, ignoring the prior snapshot
        #[arg(long)]
        force_refresh: bool,

        /// Puzzle resolutions in flight per page
        #[arg(short, long, default_value = "10")]
        concurrency: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Site the archive lives on
        #[arg(long, default_value = DEFAULT_SITE_ROOT)]
        site_root: String,

        /// Also ingest the result into this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Load an existing snapshot into SQLite
    Ingest {
        #[arg(short, long, default_value = "puzzles.json")]
        input: PathBuf,

        #[arg(long, default_value = "puzzles.db")]
        db: PathBuf,
    },

    /// Print solver statistics
    Stats {
        #[arg(short, long, default_value = "puzzles.json")]
        input: PathBuf,

        /// Rows shown in the ranked tables
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Also report from this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    lifecycle::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            max_pages,
            output,
            force_refresh,
            concurrency,
            timeout_secs,
            site_root,
            db,
        } => {
            let settings = ScrapeSettings {
                max_pages,
                concurrency: concurrency.max(1),
                request_timeout: Duration::from_secs(timeout_secs),
                force_refresh,
                ..Default::default()
            };
            scrape(settings, &site_root, output, db.as_deref()).await
        }
        Commands::Ingest { input, db } => ingest(&input, &db).await,
        Commands::Stats { input, top, db } => stats(&input, top, db.as_deref()).await,
    }
}

async fn scrape(
    settings: ScrapeSettings,
    site_root: &str,
    output: PathBuf,
    db_path: Option<&Path>,
) -> Result<()> {
    let endpoints = ArchiveEndpoints::new(site_root)?;
    let store = JsonSnapshotStore::new(output);
    let prior = store.load_index().await;

    let client = Arc::new(HttpArchiveClient::new(&settings)?);
    let outcome = ArchiveScraper::new(client, endpoints, settings)
        .run(&prior)
        .await;

    let mut sinks: Vec<Box<dyn PuzzleSink>> = vec![Box::new(store)];
    let pool = match db_path {
        Some(path) => Some(db::open(path).await?),
        None => None,
    };
    if let Some(pool) = &pool {
        sinks.push(Box::new(PuzzleRepository::new(pool.clone())));
    }

    for sink in &sinks {
        sink.store(&outcome.entries).await?;
    }
    if let Some(pool) = pool {
        pool.close().await;
    }

    let report = &outcome.report;
    println!(
        "Scraped {} puzzles from {} pages ({} resolved, {} reused, {} duplicates skipped)",
        outcome.entries.len(),
        report.pages_requested,
        report.resolved,
        report.reused,
        report.duplicates
    );
    println!("Stopped: {:?}", report.stop);
    Ok(())
}

async fn ingest(input: &Path, db_path: &Path) -> Result<()> {
    let entries = JsonSnapshotStore::new(input).load().await;
    if entries.is_empty() {
        log::warn!("[INGEST] {} holds no entries, nothing to ingest", input.display());
        return Ok(());
    }

    let pool = db::open(db_path).await?;
    let summary = PuzzleRepository::new(pool.clone()).ingest(&entries).await;
    pool.close().await;
    let summary = summary?;

    println!(
        "Ingested {} puzzles and {} submissions into {} ({} skipped)",
        summary.puzzles,
        summary.submissions,
        db_path.display(),
        summary.skipped
    );
    Ok(())
}

async fn stats(input: &Path, top: usize, db_path: Option<&Path>) -> Result<()> {
    let entries = JsonSnapshotStore::new(input).load().await;
    let stats = LeaderboardStats::from_entries(&entries);
    let today = PuzzleMonth::from_date(chrono::Local::now().date_naive());

    println!("Puzzles: {}  Unique solvers: {}", entries.len(), stats.solver_count());

    println!("\nTop solvers");
    for (rank, s) in stats.top_solvers(top).iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:>4} solved  {} - {}",
            rank + 1,
            s.display_name,
            s.total_solved,
            s.first_solve.short_label(),
            s.last_solve.short_label()
        );
    }

    println!("\nLongest streaks");
    for (rank, s) in stats.longest_streaks(top).iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:>3} months  {} - {}",
            rank + 1,
            s.display_name,
            s.max_streak.length,
            s.max_streak.start.short_label(),
            s.max_streak.end.short_label()
        );
    }

    println!("\nRising stars");
    for star in stats.rising_stars(today) {
        println!(
            "     {:<30} {:>3} solved in {:>2} months ({:.2}/month, since {})",
            star.display_name,
            star.total_solved,
            star.months_active,
            star.solve_rate,
            star.first_solve.short_label()
        );
    }

    println!("\nMonthly participation");
    for point in stats.monthly_participation(PARTICIPATION_WINDOW_MONTHS) {
        println!("     {}  {:>4}", point.month.short_label(), point.solvers);
    }

    if let Some(last) = stats.unique_solver_growth().last() {
        println!(
            "\nUnique solvers through {}: {}",
            last.month.short_label(),
            last.cumulative
        );
    }

    println!("\nPuzzles solved per solver");
    for bucket in stats.frequency_distribution() {
        println!("     {:>4} puzzles: {:>5} solvers", bucket.submissions, bucket.solvers);
    }

    if let Some(path) = db_path {
        let pool = db::open(path).await?;
        let report = database_report(StatsRepository::new(pool.clone()), top).await;
        pool.close().await;
        report?;
    }

    Ok(())
}

async fn database_report(repo: StatsRepository, top: usize) -> Result<()> {
    println!("\nDatabase: {} unique users", repo.unique_users().await?);
    for (rank, tally) in repo.top_users(top as i64).await?.iter().enumerate() {
        println!("{:>3}. {:<30} {:>4}", rank + 1, tally.name, tally.submissions);
    }
    for bucket in repo.submission_distribution().await? {
        println!("     {:>4} submissions: {:>5} users", bucket.submissions, bucket.solvers);
    }
    Ok(())
}
