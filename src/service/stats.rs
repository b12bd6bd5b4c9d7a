//! # Leaderboard statistics
//!
//! Aggregates computed in memory from a list of puzzle entries (usually the
//! JSON snapshot). Solvers are keyed by normalized name, so `"Ann (Paris)"`
//! and `"ann"` count as the same person.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::domain::models::{FrequencyBucket, PuzzleEntry, PuzzleMonth};

// ====== Tunables ======

/// A rising star's first solve is at most this many months ago.
pub const RISING_STAR_WINDOW_MONTHS: i32 = 12;
pub const RISING_STAR_MIN_PUZZLES: usize = 3;
pub const RISING_STAR_LIMIT: usize = 10;
pub const PARTICIPATION_WINDOW_MONTHS: usize = 36;

// ====== Report Types ======

/// A run of consecutive calendar months with at least one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub length: usize,
    pub start: PuzzleMonth,
    pub end: PuzzleMonth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    /// First spelling seen for this solver.
    pub display_name: String,
    pub normalized_name: String,
    pub total_solved: usize,
    pub first_solve: PuzzleMonth,
    pub last_solve: PuzzleMonth,
    /// Distinct months with a solve.
    pub active_months: usize,
    pub max_streak: Streak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RisingStar {
    pub display_name: String,
    pub first_solve: PuzzleMonth,
    pub total_solved: usize,
    /// Months from first to last solve, inclusive.
    pub months_active: i32,
    pub solve_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyParticipation {
    pub month: PuzzleMonth,
    pub solvers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthPoint {
    pub month: PuzzleMonth,
    /// Distinct solvers seen up to and including `month`.
    pub cumulative: usize,
}

// ====== Aggregation ======

#[derive(Debug, Default)]
struct SolverAccumulator {
    display_name: String,
    total_solved: usize,
    months: BTreeSet<PuzzleMonth>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardStats {
    solvers: Vec<SolverStats>,
    participation: BTreeMap<PuzzleMonth, usize>,
    growth: Vec<GrowthPoint>,
    undated: usize,
}

impl LeaderboardStats {
    pub fn from_entries(entries: &[PuzzleEntry]) -> Self {
        let mut by_solver: HashMap<String, SolverAccumulator> = HashMap::new();
        let mut monthly: BTreeMap<PuzzleMonth, HashSet<String>> = BTreeMap::new();
        let mut undated = 0;

        for entry in entries {
            let Some(month) = entry.month() else {
                log::debug!("[STATS] Ignoring {}: date is not a month", entry.key());
                undated += 1;
                continue;
            };

            let month_solvers = monthly.entry(month).or_default();
            let mut seen_in_entry = HashSet::new();
            for solver in entry.solver_names() {
                if !seen_in_entry.insert(solver.normalized.clone()) {
                    continue;
                }
                month_solvers.insert(solver.normalized.clone());

                let acc = by_solver
                    .entry(solver.normalized)
                    .or_insert_with(|| SolverAccumulator {
                        display_name: solver.display,
                        ..Default::default()
                    });
                acc.total_solved += 1;
                acc.months.insert(month);
            }
        }

        let mut growth = Vec::with_capacity(monthly.len());
        let mut seen = HashSet::new();
        for (month, solvers) in &monthly {
            seen.extend(solvers.iter().cloned());
            growth.push(GrowthPoint {
                month: *month,
                cumulative: seen.len(),
            });
        }

        let participation = monthly
            .into_iter()
            .filter(|(_, solvers)| !solvers.is_empty())
            .map(|(month, solvers)| (month, solvers.len()))
            .collect();

        let mut solvers: Vec<SolverStats> = by_solver
            .into_iter()
            .filter_map(|(normalized_name, acc)| summarize(normalized_name, acc))
            .collect();
        solvers.sort_by(|a, b| {
            b.total_solved
                .cmp(&a.total_solved)
                .then_with(|| a.normalized_name.cmp(&b.normalized_name))
        });

        Self {
            solvers,
            participation,
            growth,
            undated,
        }
    }

    pub fn solver_count(&self) -> usize {
        self.solvers.len()
    }

    /// Entries skipped because their date text is not a month.
    pub fn undated_entries(&self) -> usize {
        self.undated
    }

    pub fn solver(&self, normalized_name: &str) -> Option<&SolverStats> {
        self.solvers
            .iter()
            .find(|s| s.normalized_name == normalized_name)
    }

    /// Most puzzles solved first.
    pub fn top_solvers(&self, limit: usize) -> &[SolverStats] {
        &self.solvers[..limit.min(self.solvers.len())]
    }

    pub fn longest_streaks(&self, limit: usize) -> Vec<&SolverStats> {
        let mut ranked: Vec<&SolverStats> = self.solvers.iter().collect();
        ranked.sort_by(|a, b| {
            b.max_streak
                .length
                .cmp(&a.max_streak.length)
                .then_with(|| a.normalized_name.cmp(&b.normalized_name))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Recent newcomers with enough solves, ranked by puzzles per active month.
    pub fn rising_stars(&self, today: PuzzleMonth) -> Vec<RisingStar> {
        let mut stars: Vec<RisingStar> = self
            .solvers
            .iter()
            .filter(|s| s.first_solve.months_until(today) <= RISING_STAR_WINDOW_MONTHS)
            .filter(|s| s.total_solved >= RISING_STAR_MIN_PUZZLES)
            .map(|s| {
                let months_active = s.first_solve.months_until(s.last_solve) + 1;
                RisingStar {
                    display_name: s.display_name.clone(),
                    first_solve: s.first_solve,
                    total_solved: s.total_solved,
                    months_active,
                    solve_rate: s.total_solved as f64 / months_active as f64,
                }
            })
            .collect();

        stars.sort_by(|a, b| {
            b.solve_rate
                .total_cmp(&a.solve_rate)
                .then_with(|| b.total_solved.cmp(&a.total_solved))
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        stars.truncate(RISING_STAR_LIMIT);
        stars
    }

    /// Distinct solvers per month for the most recent `months` months that
    /// had any solver, oldest first.
    pub fn monthly_participation(&self, months: usize) -> Vec<MonthlyParticipation> {
        let skip = self.participation.len().saturating_sub(months);
        self.participation
            .iter()
            .skip(skip)
            .map(|(month, solvers)| MonthlyParticipation {
                month: *month,
                solvers: *solvers,
            })
            .collect()
    }

    /// Cumulative distinct solvers, one point per month in the data.
    pub fn unique_solver_growth(&self) -> &[GrowthPoint] {
        &self.growth
    }

    pub fn frequency_distribution(&self) -> Vec<FrequencyBucket> {
        let mut buckets: BTreeMap<usize, i64> = BTreeMap::new();
        for solver in &self.solvers {
            *buckets.entry(solver.total_solved).or_default() += 1;
        }
        buckets
            .into_iter()
            .map(|(submissions, solvers)| FrequencyBucket {
                submissions: submissions as i64,
                solvers,
            })
            .collect()
    }
}

fn summarize(normalized_name: String, acc: SolverAccumulator) -> Option<SolverStats> {
    let first_solve = *acc.months.first()?;
    let last_solve = *acc.months.last()?;

    Some(SolverStats {
        display_name: acc.display_name,
        normalized_name,
        total_solved: acc.total_solved,
        first_solve,
        last_solve,
        active_months: acc.months.len(),
        max_streak: longest_streak(&acc.months)?,
    })
}

/// Longest run of consecutive months. The earliest run wins a tie.
fn longest_streak(months: &BTreeSet<PuzzleMonth>) -> Option<Streak> {
    let mut iter = months.iter().copied();
    let first = iter.next()?;
    let mut best = Streak {
        length: 1,
        start: first,
        end: first,
    };
    let mut current = best;

    for month in iter {
        if current.end.next() == month {
            current.length += 1;
            current.end = month;
        } else {
            current = Streak {
                length: 1,
                start: month,
                end: month,
            };
        }
        if current.length > best.length {
            best = current;
        }
    }

    Some(best)
}
