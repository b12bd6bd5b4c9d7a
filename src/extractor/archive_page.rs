use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::models::{ArchiveRow, PuzzleMonth};
use crate::domain::ArchiveEndpoints;

/// Result of parsing one archive listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchivePage {
    /// Rows in the order the page lists them. May be empty.
    Listing(Vec<ArchiveRow>),
    /// The listing container is not on the page at all.
    MissingContainer,
}

#[cfg(test)]
impl ArchivePage {
    fn into_rows(self) -> Vec<ArchiveRow> {
        match self {
            ArchivePage::Listing(rows) => rows,
            ArchivePage::MissingContainer => Vec::new(),
        }
    }
}

pub struct ArchivePageExtractor;

impl ArchivePageExtractor {
    pub fn parse(html: &str, endpoints: &ArchiveEndpoints) -> ArchivePage {
        static CONTAINER: OnceLock<Selector> = OnceLock::new();
        let container_selector = CONTAINER.get_or_init(|| {
            Selector::parse("body > div.site-wrap > main > div > div.container > div > div").unwrap()
        });
        static ROW: OnceLock<Selector> = OnceLock::new();
        let row_selector = ROW.get_or_init(|| Selector::parse("div.row").unwrap());

        let document = Html::parse_document(html);
        let Some(container) = document.select(container_selector).next() else {
            return ArchivePage::MissingContainer;
        };

        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for element in container.select(row_selector) {
            let Some(row) = Self::extract_row(element, endpoints) else {
                continue;
            };
            if !seen.insert(row.key()) {
                log::warn!("[ARCHIVE] Duplicate listing row skipped: {}", row.key());
                continue;
            }
            rows.push(row);
        }

        ArchivePage::Listing(rows)
    }

    fn extract_row(row: ElementRef<'_>, endpoints: &ArchiveEndpoints) -> Option<ArchiveRow> {
        static DATE: OnceLock<Selector> = OnceLock::new();
        let date_selector = DATE.get_or_init(|| Selector::parse(".left span.date").unwrap());
        static NAME: OnceLock<Selector> = OnceLock::new();
        let name_selector = NAME.get_or_init(|| Selector::parse(".left span.name").unwrap());
        static SOLUTION: OnceLock<Selector> = OnceLock::new();
        let solution_selector =
            SOLUTION.get_or_init(|| Selector::parse(".right a.solution-link").unwrap());

        let date_text = row
            .select(date_selector)
            .next()
            .map(element_text)
            .map(|t| t.trim_end_matches(':').trim_end().to_string())
            .filter(|t| !t.is_empty());
        let name = row
            .select(name_selector)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty());

        let (Some(date_text), Some(name)) = (date_text, name) else {
            log::trace!("[ARCHIVE] Row without date or title skipped");
            return None;
        };

        let Some(month) = PuzzleMonth::parse(&date_text) else {
            log::warn!("[ARCHIVE] Unrecognised date {:?} for {:?}, row skipped", date_text, name);
            return None;
        };
        // Keys carry the full month name so "Nov 2015" and "November 2015" collide here
        // the same way they do in SQLite.
        let date_text = month.to_string();

        let solution_url = row
            .select(solution_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| match endpoints.solution_url(href) {
                Ok(url) => Some(url),
                Err(e) => {
                    log::warn!("[ARCHIVE] Bad solution link {:?} for {:?}: {}", href, name, e);
                    None
                }
            });

        Some(ArchiveRow {
            date_text,
            month,
            name,
            solution_url,
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
