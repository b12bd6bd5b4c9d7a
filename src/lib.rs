// src/lib.rs

pub mod db;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod test_utils;

pub use domain::models::{PuzzleEntry, ScrapeSettings};
pub use repository::{JsonSnapshotStore, PuzzleSink};
pub use service::pipeline::{ArchiveScraper, ScrapeOutcome, ScrapeReport};
