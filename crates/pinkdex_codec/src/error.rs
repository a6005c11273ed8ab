//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while parsing catalog text.
///
/// Every variant is local to the token or line being parsed. Callers
/// loading many lines are expected to record the failure and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A catalog line did not have the expected structure.
    #[error("malformed line: {message}")]
    MalformedLine {
        /// Description of the structural problem.
        message: String,
    },

    /// An edition token did not match the shelfcode grammar.
    #[error("invalid shelfcode: {code}")]
    InvalidShelfcode {
        /// The token that failed to classify.
        code: String,
    },

    /// The `:COUNT` suffix of an edition token was not an integer.
    #[error("invalid count in edition token: {token}")]
    InvalidCount {
        /// The full edition token.
        token: String,
    },

    /// A shelfcode registry could not be compiled into a grammar.
    #[error("invalid shelfcode grammar: {message}")]
    InvalidGrammar {
        /// Description of the problem.
        message: String,
    },
}

impl CodecError {
    /// Create a malformed line error.
    pub fn malformed_line(message: impl Into<String>) -> Self {
        Self::MalformedLine {
            message: message.into(),
        }
    }

    /// Create an invalid shelfcode error.
    pub fn invalid_shelfcode(code: impl Into<String>) -> Self {
        Self::InvalidShelfcode { code: code.into() }
    }

    /// Create an invalid count error.
    pub fn invalid_count(token: impl Into<String>) -> Self {
        Self::InvalidCount {
            token: token.into(),
        }
    }

    /// Create an invalid grammar error.
    pub fn invalid_grammar(message: impl Into<String>) -> Self {
        Self::InvalidGrammar {
            message: message.into(),
        }
    }
}
