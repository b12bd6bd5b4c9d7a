//! Rich domain entities - behavior lives WITH data

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// First month for which the archive publishes leaderboards.
pub const LEADERBOARD_CUTOFF: PuzzleMonth = PuzzleMonth {
    year: 2015,
    month: 11,
};

// ====== Value Types ======

/// Calendar month of a puzzle. The archive never publishes a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PuzzleMonth {
    year: i32,
    month: u32,
}

impl PuzzleMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Parses listing text such as `"November 2015"` or `"Nov 2015:"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().trim_end_matches(':').trim();
        if text.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&format!("1 {}", text), "%d %B %Y")
            .ok()
            .map(Self::from_date)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year/month are validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The calendar month immediately after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Signed number of months from `self` to `later`.
    pub fn months_until(&self, later: PuzzleMonth) -> i32 {
        (later.year - self.year) * 12 + later.month as i32 - self.month as i32
    }

    /// Short label used in reports, e.g. `Nov 2015`.
    pub fn short_label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }
}

impl fmt::Display for PuzzleMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day().format("%B %Y"))
    }
}

/// Natural key of a puzzle: the published date text plus its title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PuzzleKey {
    pub date_text: String,
    pub name: String,
}

impl PuzzleKey {
    pub fn new(date_text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            date_text: date_text.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PuzzleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.date_text, self.name)
    }
}

/// A solver name split into its display form and its deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolverName {
    /// Annotation stripped, original case.
    pub display: String,
    /// Lowercased display form.
    pub normalized: String,
}

// ====== Enums ======

/// What is known about a puzzle's leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardStatus {
    /// No solution published yet.
    #[default]
    Open,
    /// Leaderboard requested; `solvers` holds whatever it returned.
    Available,
    /// Puzzle predates the first published leaderboard.
    PreCutoff,
    /// The solution page carries no leaderboard identifier.
    NoMetadata,
    /// The leaderboard request failed; `solvers` says nothing about who solved it.
    FetchFailed,
}

impl LeaderboardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardStatus::Open => "open",
            LeaderboardStatus::Available => "available",
            LeaderboardStatus::PreCutoff => "pre_cutoff",
            LeaderboardStatus::NoMetadata => "no_metadata",
            LeaderboardStatus::FetchFailed => "fetch_failed",
        }
    }
}

// ====== Scraped Rows ======

/// One row of an archive listing page, before any leaderboard work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRow {
    pub date_text: String,
    pub month: PuzzleMonth,
    pub name: String,
    pub solution_url: Option<Url>,
}

impl ArchiveRow {
    pub fn key(&self) -> PuzzleKey {
        PuzzleKey::new(&self.date_text, &self.name)
    }
}

// ====== Rich Entity: PuzzleEntry ======

/// A puzzle and the solvers credited on its leaderboard.
///
/// This is also the record shape of the JSON snapshot. Deserialization accepts
/// the placeholder strings older snapshots used for missing values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleEntry {
    pub date_text: String,
    pub name: String,
    #[serde(default, deserialize_with = "solution_url_or_placeholder")]
    pub solution_url: Option<String>,
    #[serde(default, alias = "data_directory")]
    pub leaderboard_id: Option<String>,
    #[serde(default)]
    pub leaderboard: LeaderboardStatus,
    #[serde(default, deserialize_with = "solvers_or_note")]
    pub solvers: Vec<String>,
}

impl PuzzleEntry {
    /// Entry for a puzzle whose solution has not been published.
    pub fn open(row: &ArchiveRow) -> Self {
        Self {
            date_text: row.date_text.clone(),
            name: row.name.clone(),
            solution_url: row.solution_url.as_ref().map(Url::to_string),
            leaderboard_id: None,
            leaderboard: LeaderboardStatus::Open,
            solvers: Vec::new(),
        }
    }

    /// Entry for a solved puzzle whose leaderboard is not fetched.
    pub fn without_leaderboard(
        row: &ArchiveRow,
        status: LeaderboardStatus,
        leaderboard_id: Option<String>,
    ) -> Self {
        Self {
            leaderboard: status,
            leaderboard_id,
            ..Self::open(row)
        }
    }

    /// Entry for a solved puzzle with a fetched leaderboard.
    pub fn with_solvers(row: &ArchiveRow, leaderboard_id: String, solvers: Vec<SolverName>) -> Self {
        Self {
            leaderboard: LeaderboardStatus::Available,
            leaderboard_id: Some(leaderboard_id),
            solvers: solvers.into_iter().map(|s| s.display).collect(),
            ..Self::open(row)
        }
    }

    pub fn key(&self) -> PuzzleKey {
        PuzzleKey::new(&self.date_text, &self.name)
    }

    pub fn month(&self) -> Option<PuzzleMonth> {
        PuzzleMonth::parse(&self.date_text)
    }

    pub fn is_open(&self) -> bool {
        self.solution_url.is_none()
    }

    /// Solvers split into display and normalized forms, in leaderboard order.
    pub fn solver_names(&self) -> Vec<SolverName> {
        self.solvers
            .iter()
            .map(|s| crate::extractor::solver_name::split(s))
            .filter(|s| !s.normalized.is_empty())
            .collect()
    }
}

fn solution_url_or_placeholder<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| Url::parse(s).is_ok()))
}

fn solvers_or_note<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SolversField {
        List(Vec<String>),
        Note(String),
    }

    Ok(match Option::<SolversField>::deserialize(deserializer)? {
        Some(SolversField::List(names)) => names,
        Some(SolversField::Note(_)) | None => Vec::new(),
    })
}

// ====== Persisted Records ======

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverRecord {
    pub id: i64,
    pub original_name: String,
    pub normalized_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub puzzle_id: i64,
    pub user_id: i64,
}

// ====== Reporting ======

/// Submissions credited to one solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolverTally {
    pub name: String,
    pub submissions: i64,
}

/// Number of solvers credited with exactly `submissions` puzzles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrequencyBucket {
    pub submissions: i64,
    pub solvers: i64,
}

// ====== Settings ======

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSettings {
    /// Stop after this many listing pages. `None` walks until an empty page.
    pub max_pages: Option<u32>,
    /// Puzzle resolutions in flight per page.
    pub concurrency: usize,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Ignore the prior snapshot entirely.
    pub force_refresh: bool,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            max_pages: None,
            concurrency: 10,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("puzzle-leaderboard/", env!("CARGO_PKG_VERSION")).to_string(),
            force_refresh: false,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parsing() {
        assert_eq!(PuzzleMonth::parse("November 2015"), PuzzleMonth::new(2015, 11));
        assert_eq!(PuzzleMonth::parse("  January 2020: "), PuzzleMonth::new(2020, 1));
        assert_eq!(PuzzleMonth::parse("Sept. 2020"), None);
        assert_eq!(PuzzleMonth::parse(""), None);
        assert_eq!(PuzzleMonth::new(2020, 13), None);
    }

    #[test]
    fn test_month_ordering_and_arithmetic() {
        let oct = PuzzleMonth::new(2015, 10).unwrap();
        let dec = PuzzleMonth::new(2015, 12).unwrap();
        assert!(oct < LEADERBOARD_CUTOFF);
        assert!(dec > LEADERBOARD_CUTOFF);
        assert_eq!(dec.next(), PuzzleMonth::new(2016, 1).unwrap());
        assert_eq!(oct.months_until(PuzzleMonth::new(2016, 2).unwrap()), 4);
        assert_eq!(LEADERBOARD_CUTOFF.to_string(), "November 2015");
        assert_eq!(LEADERBOARD_CUTOFF.short_label(), "Nov 2015");
    }

    #[test]
    fn test_entry_roundtrip_keeps_fields() {
        let entry = PuzzleEntry {
            date_text: "January 2020".into(),
            name: "Puzzle X".into(),
            solution_url: Some("https://example.com/puzzles/x-solution/".into()),
            leaderboard_id: Some("x".into()),
            leaderboard: LeaderboardStatus::Available,
            solvers: vec!["Jane Doe".into(), "Bob".into()],
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"leaderboard\":\"available\""));
        let back: PuzzleEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_legacy_snapshot_placeholders() {
        let json = r#"[
            {"date_text": "October 2015", "name": "Old",
             "solution_url": "https://example.com/old-solution/",
             "solvers": "Submissions not available before November 2015"},
            {"date_text": "March 2024", "name": "Current",
             "solution_url": "Solution URL not available", "solvers": null},
            {"date_text": "May 2019", "name": "Legacy", "data_directory": "legacy"}
        ]"#;
        let entries: Vec<PuzzleEntry> = serde_json::from_str(json).unwrap();

        assert!(entries[0].solvers.is_empty());
        assert!(entries[0].solution_url.is_some());
        assert_eq!(entries[1].solution_url, None);
        assert!(entries[1].is_open());
        assert_eq!(entries[1].leaderboard, LeaderboardStatus::Open);
        assert_eq!(entries[2].leaderboard_id.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_solver_names_drop_blank_entries() {
        let entry = PuzzleEntry {
            date_text: "January 2020".into(),
            name: "Puzzle X".into(),
            solution_url: None,
            leaderboard_id: None,
            leaderboard: LeaderboardStatus::Available,
            solvers: vec!["Jane Doe (NYC)".into(), " (anon) ".into()],
        };
        let names = entry.solver_names();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].normalized, "jane doe");
    }
}
