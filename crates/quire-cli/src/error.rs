//! Error types for quire-cli.

use thiserror::Error;

/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a command can finish with.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from the Quire libraries.
    #[error(transparent)]
    Core(#[from] quire_core::Error),

    /// Missing or inconsistent command input.
    #[error("{0}")]
    Usage(String),

    /// Some tooling links are unreachable.
    #[error("Link check failed for {failed} of {checked} links")]
    LinksFailed {
        /// Number of failing links.
        failed: usize,
        /// Number of links checked.
        checked: usize,
    },
}

impl Error {
    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    /// Process exit status for this error.
    ///
    /// Library errors keep their own codes (2 for a missing document, 3 for
    /// a missing section); failed link checks exit 2; usage errors exit 1.
    pub fn exit_code(&self) -> u8 {
        let code = match self {
            Error::Core(e) => e.exit_code(),
            Error::Usage(_) => 1,
            Error::LinksFailed { .. } => 2,
        };
        u8::try_from(code).unwrap_or(1)
    }

    /// Close matches to print after a failed document lookup.
    pub fn suggestions(&self) -> &[String] {
        match self {
            Error::Core(quire_core::Error::DocumentNotFound { suggestions, .. }) => suggestions,
            _ => &[],
        }
    }
}
