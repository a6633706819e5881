//! Error types for the service registry workspace.
//!
//! # Rust Learning Note
//!
//! Rust has no exceptions - fallible operations return `Result<T, E>`
//! and callers propagate failures with `?`:
//!
//! ```rust
//! use svcreg_common::{Error, Result};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| Error::validation(format!("bad port: {}", raw)))
//! }
//!
//! fn caller() -> Result<()> {
//!     let _port = parse_port("8080")?;
//!     Ok(())
//! }
//! ```
//!
//! Note what is *not* an error here: a registry lookup that finds
//! nothing is an ordinary `bool`/empty `Vec`, and an HTTP 404 received by
//! the client is an ordinary response. Only failures that stop an
//! operation from completing become `Error` values.

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input or configuration.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// A URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        url: String,
        reason: String,
    },

    /// The URL uses a scheme the client cannot speak.
    #[error("Unsupported URL scheme: {scheme}")]
    UnsupportedScheme {
        scheme: String,
    },

    /// Network-level failure (connection refused, DNS, broken pipe...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON encoding failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (shouldn't happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error (wraps std::io::Error).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context.
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an InvalidUrl error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an UnsupportedScheme error.
    pub fn unsupported_scheme(scheme: impl Into<String>) -> Self {
        Self::UnsupportedScheme {
            scheme: scheme.into(),
        }
    }

    /// Adds context to an error.
    ///
    /// # Example
    /// ```
    /// use svcreg_common::{Error, Result};
    ///
    /// fn inner() -> Result<()> {
    ///     Err(Error::Transport("connection refused".into()))
    /// }
    ///
    /// fn outer() -> Result<()> {
    ///     inner().map_err(|e| e.context("Failed to reach registry"))
    /// }
    /// ```
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::WithContext {
            message: message.into(),
            source: Box::new(self),
        }
    }
}

// Convenience methods for Result types
pub trait ResultExt<T> {
    /// Adds context to an error result.
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(message))
    }
}
