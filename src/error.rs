use std::time::Duration;
use thiserror::Error;
use tokio::sync::AcquireError;

#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    #[error("Browser instance unavailable")]
    BrowserUnavailable,

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    #[error("Page error: {0}")]
    PageError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Semaphore acquire error: {0}")]
    SemaphoreError(String),
}

impl ScrapeError {
    /// True for the failure class where the page snapshot could not be
    /// produced at all. The service absorbs these into an empty record
    /// sequence instead of propagating them to the caller.
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            ScrapeError::BrowserUnavailable
                | ScrapeError::BrowserLaunchFailed(_)
                | ScrapeError::NavigationFailed(_)
                | ScrapeError::NavigationTimeout(_)
                | ScrapeError::PageError(_)
        )
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScrapeError::InvalidUrl(_) => ErrorSeverity::Low,
            ScrapeError::ConfigurationError(_) => ErrorSeverity::High,
            ScrapeError::InvalidSelector(_) => ErrorSeverity::High,
            ScrapeError::BrowserLaunchFailed(_) => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

impl From<AcquireError> for ScrapeError {
    fn from(err: AcquireError) -> Self {
        ScrapeError::SemaphoreError(err.to_string())
    }
}

impl From<std::io::Error> for ScrapeError {
    fn from(err: std::io::Error) -> Self {
        ScrapeError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeError::SerializationError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ScrapeError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ScrapeError::ExportFailed(err.to_string())
    }
}
