//! Error definitions for all token pipeline stages.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
pub enum TokenError {
    /// Input text is not a JSON mapping.
    #[error("parse error: {0}")]
    Parse(String),
    /// Missing section, incomplete token, or invalid color literal.
    #[error("structural error: {0}")]
    Structural(String),
    /// A token references its own path.
    #[error("reference error: self-reference detected at {path}")]
    SelfReference { path: String },
    /// A chain of references leads back to where it started.
    #[error("reference error: circular reference detected: {cycle}")]
    CircularReference { cycle: String },
    /// Two distinct paths mangle to the same exported name in one module.
    #[error("identifier collision: '{identifier}' is produced by both {first} and {second}")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },
    /// A mangled name cannot be used as an exported binding.
    #[error("invalid identifier '{identifier}' derived from {path}")]
    InvalidIdentifier { identifier: String, path: String },
    /// Filesystem I/O error from the CLI or artifact writer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
