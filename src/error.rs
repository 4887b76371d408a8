//! Error types for this crate
//!
//! Parsing is total and never produces an error; only invalid
//! configuration and serialization failures are reportable.

use std::fmt;

/// Errors the public API can return.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Formatting options failed validation.
    InvalidOptions(String),
    /// AST serialization failed.
    Serialize(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidOptions(msg) => write!(f, "invalid options: {}", msg),
            Error::Serialize(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Alias to `std::result::Result<T, unlatex::Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
