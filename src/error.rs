//! Error types for the crawl-and-extract pipeline
//!
//! Every component has its own error enum; [`Error`] wraps them so callers can
//! propagate with `?` and still tell per-page failures from run-fatal ones.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for docs-corpus operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser lifecycle errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Errors while reading the rendered DOM
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Filesystem persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Content extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Browser already closed
    #[error("Browser already closed")]
    AlreadyClosed,
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Engine-level failures while reading a page that did load
#[derive(Error, Debug)]
pub enum RenderError {
    /// Could not read the rendered document
    #[error("HTML capture failed: {0}")]
    HtmlFailed(String),

    /// Could not collect anchors from the DOM
    #[error("Link collection failed: {0}")]
    LinksFailed(String),
}

/// Filesystem persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Output directory could not be created
    #[error("Cannot create output directory {path}: {source}")]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Output directory has no snapshot directory to extract from
    #[error("No snapshot directory at {path}")]
    MissingSnapshotDir {
        /// Expected directory
        path: PathBuf,
    },

    /// Snapshot write failed
    #[error("Failed to write snapshot {identifier}: {source}")]
    SnapshotWrite {
        /// Snapshot identifier
        identifier: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Provenance log append failed
    #[error("Failed to append provenance for {identifier}: {source}")]
    ProvenanceAppend {
        /// Snapshot identifier
        identifier: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Provenance log or snapshot directory could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Document write failed
    #[error("Failed to write document {path}: {source}")]
    DocumentWrite {
        /// Document path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Snapshot could not be read as UTF-8 HTML
    #[error("Unreadable snapshot {identifier}: {reason}")]
    Unreadable {
        /// Snapshot identifier
        identifier: String,
        /// Reason
        reason: String,
    },

    /// Markdown conversion failed
    #[error("Markdown conversion failed: {0}")]
    ConversionFailed(String),
}

/// Result type alias for docs-corpus operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Whether this error only concerns a single page or file.
    ///
    /// Per-item errors are logged and skipped; everything else ends the run.
    pub fn is_page_local(&self) -> bool {
        match self {
            Error::Navigation(_) | Error::Render(_) | Error::Extraction(_) | Error::Cdp(_) => {
                true
            }
            Error::Persistence(e) => !matches!(
                e,
                PersistenceError::CreateDir { .. } | PersistenceError::MissingSnapshotDir { .. }
            ),
            Error::Browser(_) | Error::Generic(_) => false,
        }
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_navigation_error() {
        let err = NavigationError::Timeout(30000);
        assert_eq!(err.to_string(), "Navigation timed out after 30000ms");
    }

    #[test]
    fn test_persistence_error_names_identifier() {
        let err = PersistenceError::SnapshotWrite {
            identifier: "_docs_intro.html".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("_docs_intro.html"));
    }

    #[test]
    fn test_page_local_classification() {
        assert!(Error::from(NavigationError::Timeout(1)).is_page_local());
        assert!(Error::from(RenderError::HtmlFailed("x".into())).is_page_local());
        assert!(Error::from(PersistenceError::SnapshotWrite {
            identifier: "a.html".into(),
            source: std::io::Error::other("disk full"),
        })
        .is_page_local());

        assert!(!Error::from(BrowserError::LaunchFailed("x".into())).is_page_local());
        assert!(!Error::from(PersistenceError::MissingSnapshotDir {
            path: PathBuf::from("/typo/html"),
        })
        .is_page_local());
        assert!(!Error::from(PersistenceError::CreateDir {
            path: PathBuf::from("/nope"),
            source: std::io::Error::other("read-only"),
        })
        .is_page_local());
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
