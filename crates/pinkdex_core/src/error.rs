//! Error types for pinkdex core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in pinkdex core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Catalog text could not be parsed.
    #[error("codec error: {0}")]
    Codec(#[from] pinkdex_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An operation would break a collection invariant.
    #[error("invariant violation: {message}")]
    InvariantViolation {
        /// Description of the violated invariant.
        message: String,
    },

    /// A search pattern could not be compiled.
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Why it was rejected.
        message: String,
    },

    /// A new line held no positive copies, so nothing was stored.
    #[error("line holds no copies")]
    NoCopies,

    /// Another process holds the catalog lock.
    #[error("catalog locked: another process has exclusive access")]
    CatalogLocked,

    /// A shelfcode registry file could not be read.
    #[error("invalid registry: {message}")]
    InvalidRegistry {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an invariant violation error.
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid registry error.
    pub fn invalid_registry(message: impl Into<String>) -> Self {
        Self::InvalidRegistry {
            message: message.into(),
        }
    }
}
