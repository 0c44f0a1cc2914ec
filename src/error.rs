//! Error types for smartsearch.
//!
//! Error codes are organized by category:
//!
//! - **SMS-E001 to SMS-E099**: Query and parsing errors
//! - **SMS-E100 to SMS-E199**: Search job errors
//! - **SMS-E900 to SMS-E999**: Internal and miscellaneous errors

use crate::query::ParseError;
use thiserror::Error;

/// Main error type for smartsearch operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Query text could not be parsed or validated.
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] ParseError),

    /// Empty query string provided.
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// The query's repository filters matched no repositories.
    #[error("No repositories matched the query's repository filters")]
    NoResolvedRepos,

    /// A search job could not be built for a query.
    #[error("Could not create search job for {query:?}: {reason}")]
    JobCreation { query: String, reason: String },

    /// A search job failed while running.
    #[error("Search failed: {reason}")]
    SearchFailed { reason: String },

    /// The search was cancelled before it completed.
    #[error("Search cancelled")]
    Cancelled,

    /// A query rewrite produced a query that does not survive printing and
    /// parsing.
    #[error("Query rewrite failed: {reason}")]
    Transform { reason: String },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SearchError {
    /// Returns the error code for this error.
    pub const fn error_code(&self) -> &'static str {
        match self {
            SearchError::InvalidQuery(_) => "SMS-E001",
            SearchError::EmptyQuery => "SMS-E002",
            SearchError::NoResolvedRepos => "SMS-E101",
            SearchError::JobCreation { .. } => "SMS-E102",
            SearchError::SearchFailed { .. } => "SMS-E103",
            SearchError::Cancelled => "SMS-E104",
            SearchError::Transform { .. } => "SMS-E901",
            SearchError::IoError(_) => "SMS-E902",
            SearchError::JsonError(_) => "SMS-E903",
        }
    }

    /// Returns the severity level for this error.
    pub const fn severity(&self) -> &'static str {
        match self {
            SearchError::NoResolvedRepos | SearchError::Cancelled => "warning",
            _ => "error",
        }
    }

    /// Returns remediation hints for this error, if available.
    pub const fn remediation(&self) -> Option<&'static str> {
        match self {
            SearchError::InvalidQuery(_) => {
                Some("Check that the query is properly formatted, quotes are closed and regular expressions compile.")
            }
            SearchError::EmptyQuery => Some("Provide a non-empty query string using --query."),
            SearchError::NoResolvedRepos => {
                Some("Loosen or remove repo: filters so that at least one repository matches.")
            }
            SearchError::JobCreation { .. } => None,
            SearchError::SearchFailed { .. } => None,
            SearchError::Cancelled => None,
            SearchError::Transform { .. } => {
                Some("This is a bug in a query rewrite rule. Run with -v to see the rule and query.")
            }
            SearchError::IoError(_) => Some("Check file permissions and disk space."),
            SearchError::JsonError(_) => None,
        }
    }
}
