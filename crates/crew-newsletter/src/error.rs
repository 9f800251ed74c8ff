//! Error types for newsletter operations

use thiserror::Error;

/// Newsletter specific errors
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// Market data fetch failed
    #[error("Market data error: {0}")]
    MarketDataError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        /// Requested symbol
        symbol: String,
        /// Why the data could not be produced
        reason: String,
    },

    /// News search failed
    #[error("News search error: {0}")]
    SearchError(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Template rendering error
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Keyring credential error
    #[error(transparent)]
    KeyringError(#[from] crew_utils::KeyringError),

    /// Pipeline orchestration error
    #[error(transparent)]
    PipelineError(#[from] crew_pipeline::PipelineError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for newsletter operations
pub type Result<T> = std::result::Result<T, NewsletterError>;

/// Convert NewsletterError to crew_core::Error
impl From<NewsletterError> for crew_core::Error {
    fn from(err: NewsletterError) -> Self {
        crew_core::Error::ProcessingFailed(err.to_string())
    }
}

/// Convert crew_core::Error to NewsletterError
impl From<crew_core::Error> for NewsletterError {
    fn from(err: crew_core::Error) -> Self {
        NewsletterError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NewsletterError::InvalidSymbol("NOPE".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: NOPE");

        let err = NewsletterError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "empty history".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for AAPL: empty history");
    }

    #[test]
    fn test_error_conversion() {
        let err = NewsletterError::SearchError("timeout".to_string());
        let core_err: crew_core::Error = err.into();

        match core_err {
            crew_core::Error::ProcessingFailed(msg) => assert!(msg.contains("News search error")),
            _ => panic!("Expected ProcessingFailed variant"),
        }
    }
}
