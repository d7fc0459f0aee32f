//! Error types for the activity finder.

use thiserror::Error;

/// Errors that can occur during a finder cycle.
///
/// None of these are retried. A cycle that hits any of them aborts, and the
/// scheduler hands the error back to the process.
#[derive(Debug, Error)]
pub enum FinderError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Listing page returned a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// Listing markup did not have the expected shape
    #[error("Failed to parse listing: {0}")]
    Parse(String),

    /// A raw field could not be converted into its typed form
    #[error("Failed to normalize activity '{link}': {reason}")]
    Normalize { link: String, reason: String },

    /// Configuration document missing or malformed
    #[error("Configuration error in '{path}': {reason}")]
    Config { path: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A rule group referenced a rule that was never registered
    #[error("Rule '{name}' not found")]
    RuleNotFound { name: String },

    /// A rule name cannot be used as a seen-set file name
    #[error("Invalid rule name '{name}': must be non-empty and free of path separators")]
    InvalidRuleName { name: String },

    /// Building or sending an email failed
    #[error("Email error: {0}")]
    Email(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FinderError>;
