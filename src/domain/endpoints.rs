use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_SITE_ROOT: &str = "https://www.janestreet.com/";

const ARCHIVE_PATH: &str = "puzzles/archive/";

/// Every URL the scraper talks to, derived from one site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEndpoints {
    site_root: Url,
    archive_root: Url,
}

impl ArchiveEndpoints {
    pub fn new(site_root: &str) -> Result<Self> {
        let mut site_root = Url::parse(site_root)?;
        if site_root.cannot_be_a_base() {
            return Err(AppError::InvalidUrl(site_root.to_string()));
        }
        if !site_root.path().ends_with('/') {
            let path = format!("{}/", site_root.path());
            site_root.set_path(&path);
        }
        let archive_root = site_root.join(ARCHIVE_PATH)?;

        Ok(Self {
            site_root,
            archive_root,
        })
    }

    /// Listing page `page` (1-based). Page 1 has no page segment.
    pub fn page_url(&self, page: u32) -> Result<Url> {
        let path = if page > 1 {
            format!("page{}/index.html", page)
        } else {
            "index.html".to_string()
        };
        Ok(self.archive_root.join(&path)?)
    }

    /// Resolves a solution link as it appears in the listing markup.
    pub fn solution_url(&self, href: &str) -> Result<Url> {
        Ok(self.site_root.join(href.trim())?)
    }

    pub fn leaderboard_url(&self, leaderboard_id: &str) -> Result<Url> {
        let path = format!("puzzles/{}-leaderboard.json", leaderboard_id.trim_matches('/'));
        Ok(self.site_root.join(&path)?)
    }
}

impl Default for ArchiveEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_ROOT).unwrap_or_else(|e| panic!("bad default site root: {e}"))
    }
}
