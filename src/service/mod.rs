pub mod http;
pub mod leaderboard;
pub mod pipeline;
pub mod resolver;
pub mod stats;

pub use http::{ArchiveClient, HttpArchiveClient};
pub use leaderboard::LeaderboardFetcher;
pub use resolver::PuzzleResolver;
pub use stats::LeaderboardStats;
