//! Error types for extraction.
//!
//! [`FilingError`] covers the conditions that abort a whole document load or
//! reject a configuration. Per-item problems (an unparsable context date, a
//! non-numeric fact) are not errors: they are reported as values alongside
//! the successful output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading filings or configuring extraction.
#[derive(Error, Debug)]
pub enum FilingError {
    /// The filing could not be read from disk.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The filing is not well-formed markup.
    #[error("Markup error: {0}")]
    Markup(String),

    /// The configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`FilingError`].
pub type Result<T> = std::result::Result<T, FilingError>;
