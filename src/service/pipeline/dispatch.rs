//! Bounded, order-preserving resolution of one page's rows.

use futures::stream::{self, StreamExt};

use crate::domain::models::{ArchiveRow, PuzzleEntry};
use crate::service::resolver::PuzzleResolver;

/// Resolves `rows` with at most `limit` resolutions in flight.
///
/// The output is in input order whatever order the resolutions finish in.
pub async fn resolve_in_order(
    resolver: &PuzzleResolver,
    rows: Vec<ArchiveRow>,
    limit: usize,
) -> Vec<PuzzleEntry> {
    if rows.is_empty() {
        return Vec::new();
    }
    log::debug!("[DISPATCH] Resolving {} puzzles, {} at a time", rows.len(), limit.max(1));

    stream::iter(rows)
        .map(|row| async move { resolver.resolve(&row).await })
        .buffered(limit.max(1))
        .collect()
        .await
}
