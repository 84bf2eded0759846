//! Error types for Strata

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, StrataError>;

/// Strata error types
#[derive(Error, Debug)]
pub enum StrataError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown metric id
    #[error("metric not found: {0}")]
    MetricNotFound(u64),

    /// Page id unknown to the page store
    #[error("page not found: {0}")]
    PageNotFound(String),

    /// A page payload does not decode as the expected column
    #[error("invalid page format: {0}")]
    InvalidFormat(String),

    /// Column algebra misuse: mismatched kinds, wrong merge order,
    /// non-multiple rescale, writing through a derived column
    #[error("column logic fault: {0}")]
    Logic(String),

    /// Rejected metric configuration
    #[error("invalid options: {0}")]
    Config(String),
}

impl StrataError {
    /// Check if the error indicates missing data rather than failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StrataError::MetricNotFound(_) | StrataError::PageNotFound(_)
        )
    }
}
