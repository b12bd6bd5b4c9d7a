//! Archive scrape orchestration.
//!
//! This module coordinates one scrape run:
//! 1. Listing pages are fetched and parsed one at a time
//! 2. Each row is either settled from the prior run or queued for resolution
//! 3. Queued rows are resolved concurrently, then put back in row order
//! 4. The run stops at the first page with no rows, or at the page ceiling

mod dispatch;
mod merge;

pub use dispatch::resolve_in_order;
pub use merge::{plan, MergeDecision, PriorIndex};

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::models::{ArchiveRow, PuzzleEntry, PuzzleKey, ScrapeSettings};
use crate::domain::ArchiveEndpoints;
use crate::error::FetchError;
use crate::extractor::{ArchivePage, ArchivePageExtractor};
use crate::service::http::ArchiveClient;
use crate::service::leaderboard::LeaderboardFetcher;
use crate::service::resolver::PuzzleResolver;

// ============================================================================
// RUN REPORT
// ============================================================================

/// Why pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The page parsed but listed nothing.
    EmptyPage(u32),
    /// The page has no listing container; either past the end or redesigned.
    MissingContainer(u32),
    /// The page could not be fetched.
    Unavailable(u32, FetchError),
    /// The configured page ceiling was reached after this page.
    PageLimit(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Listing pages requested, including the one that ended the run.
    pub pages_requested: u32,
    pub resolved: usize,
    pub reused: usize,
    pub duplicates: usize,
    pub stop: StopReason,
}

#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub entries: Vec<PuzzleEntry>,
    pub report: ScrapeReport,
}

// ============================================================================
// ARCHIVE SCRAPER
// ============================================================================

pub struct ArchiveScraper {
    client: Arc<dyn ArchiveClient>,
    endpoints: ArchiveEndpoints,
    resolver: PuzzleResolver,
    settings: ScrapeSettings,
}

impl ArchiveScraper {
    pub fn new(
        client: Arc<dyn ArchiveClient>,
        endpoints: ArchiveEndpoints,
        settings: ScrapeSettings,
    ) -> Self {
        let leaderboards = LeaderboardFetcher::new(client.clone(), endpoints.clone());
        let resolver = PuzzleResolver::new(client.clone(), leaderboards);
        Self {
            client,
            endpoints,
            resolver,
            settings,
        }
    }

    /// Walks the archive and returns every entry in page-then-row order.
    pub async fn run(&self, prior: &PriorIndex) -> ScrapeOutcome {
        log::info!(
            "[ARCHIVE] Starting scrape (max pages: {:?}, concurrency: {}, prior entries: {}, force refresh: {})",
            self.settings.max_pages,
            self.settings.concurrency,
            prior.len(),
            self.settings.force_refresh
        );

        if self.settings.max_pages == Some(0) {
            log::info!("[ARCHIVE] Page limit is 0, nothing to fetch");
            return ScrapeOutcome {
                entries: Vec::new(),
                report: ScrapeReport {
                    pages_requested: 0,
                    resolved: 0,
                    reused: 0,
                    duplicates: 0,
                    stop: StopReason::PageLimit(0),
                },
            };
        }

        let mut entries = Vec::new();
        let mut seen: HashSet<PuzzleKey> = HashSet::new();
        let mut resolved = 0;
        let mut reused = 0;
        let mut duplicates = 0;
        let mut page = 1;

        let stop = loop {
            let rows = match self.fetch_page(page).await {
                Ok(ArchivePage::Listing(rows)) if rows.is_empty() => {
                    log::info!("[ARCHIVE] Page {} lists no puzzles, end of archive", page);
                    break StopReason::EmptyPage(page);
                }
                Ok(ArchivePage::Listing(rows)) => rows,
                Ok(ArchivePage::MissingContainer) => {
                    log::warn!(
                        "[ARCHIVE] Page {} has no listing container; treating as end of archive, but the page layout may have changed",
                        page
                    );
                    break StopReason::MissingContainer(page);
                }
                Err(e) => {
                    log::info!("[ARCHIVE] Page {} unavailable ({}), end of archive", page, e);
                    break StopReason::Unavailable(page, e);
                }
            };

            let fresh: Vec<ArchiveRow> = rows
                .into_iter()
                .filter(|row| {
                    let new = seen.insert(row.key());
                    if !new {
                        log::warn!("[ARCHIVE] {} already listed on an earlier page, skipped", row.key());
                        duplicates += 1;
                    }
                    new
                })
                .collect();

            let batch = self.process_page(page, fresh, prior).await;
            resolved += batch.resolved;
            reused += batch.reused;
            entries.extend(batch.entries);

            if self.settings.max_pages.is_some_and(|max| page >= max) {
                log::info!("[ARCHIVE] Reached page limit {}", page);
                break StopReason::PageLimit(page);
            }
            page += 1;
        };

        let report = ScrapeReport {
            pages_requested: page,
            resolved,
            reused,
            duplicates,
            stop,
        };
        log::info!(
            "[ARCHIVE] Scrape complete: {} puzzles ({} resolved, {} reused) from {} pages",
            entries.len(),
            report.resolved,
            report.reused,
            report.pages_requested
        );

        ScrapeOutcome { entries, report }
    }

    async fn fetch_page(&self, page: u32) -> Result<ArchivePage, FetchError> {
        let url = self
            .endpoints
            .page_url(page)
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        log::debug!("[ARCHIVE] Fetching page {}: {}", page, url);

        let html = self.client.get_text(&url).await?;
        Ok(ArchivePageExtractor::parse(&html, &self.endpoints))
    }

    #[tracing::instrument(level = "debug", skip(self, rows, prior))]
    async fn process_page(&self, page: u32, rows: Vec<ArchiveRow>, prior: &PriorIndex) -> PageBatch {
        let mut slots: Vec<Option<PuzzleEntry>> = Vec::with_capacity(rows.len());
        let mut pending = Vec::new();

        for row in rows {
            match plan(row, prior, self.settings.force_refresh) {
                MergeDecision::Reuse(entry) => slots.push(Some(entry)),
                MergeDecision::Resolve(row) => {
                    pending.push((slots.len(), row));
                    slots.push(None);
                }
            }
        }

        let reused = slots.len() - pending.len();
        let (positions, queued): (Vec<usize>, Vec<ArchiveRow>) = pending.into_iter().unzip();
        let resolved = resolve_in_order(&self.resolver, queued, self.settings.concurrency).await;
        let resolved_count = resolved.len();

        for (position, entry) in positions.into_iter().zip(resolved) {
            slots[position] = Some(entry);
        }

        log::info!(
            "[ARCHIVE] Page {}: {} puzzles ({} resolved, {} reused)",
            page,
            slots.len(),
            resolved_count,
            reused
        );

        PageBatch {
            entries: slots.into_iter().flatten().collect(),
            resolved: resolved_count,
            reused,
        }
    }
}

struct PageBatch {
    entries: Vec<PuzzleEntry>,
    resolved: usize,
    reused: usize,
}
