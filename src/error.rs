//! Error types for the puzzle leaderboard scraper.
//!
//! This module provides structured error handling with:
//! - `AppError`: Site root and link URLs that cannot be used
//! - `FetchError`: Why a single archive request produced no usable data
//! - `Result<T>` / `FetchResult<T>`: Type aliases for both

use thiserror::Error;

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

/// Errors raised outside the scrape pipeline (which degrades instead of failing).
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// FETCH ERROR
// ============================================================================

/// Reason a request to the archive yielded nothing.
///
/// The pipeline never propagates these; callers log the reason and fall back
/// to an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("payload is missing `{0}`")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if let Some(status) = error.status() {
            Self::Status(status.as_u16())
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_become_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(FetchError::from(err), FetchError::Decode(_)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Status(404).to_string(), "unexpected HTTP status 404");
        assert_eq!(
            FetchError::MissingField("leaders").to_string(),
            "payload is missing `leaders`"
        );
        assert_eq!(
            AppError::from(url::Url::parse("not a url").unwrap_err()).to_string(),
            "Invalid URL: relative URL without a base"
        );
    }
}
