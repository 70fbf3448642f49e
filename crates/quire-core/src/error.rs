//! Error types for quire-core.
//!
//! A single error enum is shared by every Quire crate. Per-file and
//! per-candidate problems are absorbed where a sensible default exists; the
//! variants here are what survives to a caller.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for Quire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Quire.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A named resource does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What kind of resource was looked up (e.g. "docs directory").
        kind: String,
        /// Name or path of the resource.
        name: String,
    },

    /// No document matched an id or filename, locally or remotely.
    #[error("Doc not found for {target}")]
    DocumentNotFound {
        /// The id or filename that was requested.
        target: String,
        /// Close matches among known document ids and titles.
        suggestions: Vec<String>,
    },

    /// The document exists but the requested heading does not.
    #[error("Section not found: {section}")]
    SectionNotFound {
        /// The section key that was requested.
        section: String,
        /// The document that was searched.
        document: PathBuf,
    },

    /// A single remote attempt failed.
    #[error("Remote error for {url}: {message}")]
    Remote {
        /// URL that was requested.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic operation failure.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Creates an I/O error carrying the path that failed.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates a remote error for one URL.
    pub fn remote(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Remote {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Creates an operation error.
    pub fn operation(message: impl Into<String>) -> Self {
        Error::Operation(message.into())
    }

    /// Returns `true` for the I/O family of errors.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::IoWithPath { .. })
    }

    /// Process exit status for a command that failed with this error.
    ///
    /// Document lookups exit 2, missing sections exit 3, and everything else
    /// exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::DocumentNotFound { .. } => 2,
            Error::SectionNotFound { .. } => 3,
            _ => 1,
        }
    }
}

/// A problem with one file during a batch operation.
///
/// Batch commands collect these instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileError {
    /// Path to the problematic file.
    pub file: PathBuf,
    /// Error message.
    pub message: String,
}

impl FileError {
    /// Record `error` against `file`.
    pub fn new(file: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self {
            file: file.into(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_with_path_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::io_with_path(io, "/tmp/docs");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/docs"));
        assert!(msg.contains("missing"));
        assert!(err.is_io());
    }

    #[test]
    fn test_document_not_found_display() {
        let err = Error::DocumentNotFound {
            target: "react-rules".to_string(),
            suggestions: vec!["react".to_string()],
        };
        assert_eq!(err.to_string(), "Doc not found for react-rules");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_section_not_found_is_distinct() {
        let err = Error::SectionNotFound {
            section: "conventions".to_string(),
            document: PathBuf::from("docs/react.md"),
        };
        assert_eq!(err.to_string(), "Section not found: conventions");
        assert_eq!(err.exit_code(), 3);
        assert!(!err.is_io());
    }

    #[test]
    fn test_other_errors_exit_one() {
        assert_eq!(Error::config("bad").exit_code(), 1);
        assert_eq!(Error::not_found("docs", "docs directory").exit_code(), 1);
        assert_eq!(Error::remote("https://x", "500").exit_code(), 1);
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("/repo/docs", "docs directory");
        assert_eq!(err.to_string(), "docs directory not found: /repo/docs");
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
