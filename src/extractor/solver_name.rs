//! Solver name cleanup.
//!
//! Leaderboards list names as free text, often with a location or team tag in
//! parentheses (`"Jane Doe (NYC)"`). The tag is dropped for display and the
//! lowercased result is the key that deduplicates solvers across puzzles.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::models::SolverName;

fn annotation() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\([^)]*\)").unwrap())
}

/// Removes parenthesized annotations and surrounding whitespace.
pub fn display_name(raw: &str) -> String {
    annotation().replace_all(raw, "").trim().to_string()
}

/// Deduplication key for a raw solver name.
pub fn normalize(raw: &str) -> String {
    display_name(raw).to_lowercase()
}

pub fn split(raw: &str) -> SolverName {
    let display = display_name(raw);
    let normalized = display.to_lowercase();
    SolverName {
        display,
        normalized,
    }
}
