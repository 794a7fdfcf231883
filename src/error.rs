//! Error types for the visit tracker.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use visit_tracker::{Result, VisitReporter};
//!
//! async fn example(reporter: &dyn VisitReporter) -> Result<()> {
//!     let outcome = reporter.report(&report).await?;
//!     Ok(())
//! }
//! ```
//!
//! Note that the reactive tracker handlers themselves never return errors:
//! every failure they encounter is contained and logged (see
//! [`crate::tracker`]). `Error` exists for the component APIs underneath —
//! the reporter, the consent store, and their configuration.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::Url`] |
//! | Companion transport | [`Error::Transport`], [`Error::UnexpectedStatus`], [`Error::Http`] |
//! | Consent persistence | [`Error::ConsentStore`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when reporter or consent-store configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Companion Transport Errors
    // ========================================================================
    /// Companion service unreachable or the request failed in transit.
    ///
    /// This is the recoverable, expected condition: the companion may simply
    /// not be running. Callers roll back the optimistic dedup mark.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// Companion responded with a non-success HTTP status.
    #[error("Companion returned HTTP {status}")]
    UnexpectedStatus {
        /// HTTP status code received.
        status: u16,
    },

    // ========================================================================
    // Consent Persistence Errors
    // ========================================================================
    /// Consent store read or write failed.
    ///
    /// Only surfaced from the explicit [`grant`](crate::consent::ConsentGate::grant)
    /// path; the read path treats an unreadable store as "not consented".
    #[error("Consent store error: {message}")]
    ConsentStore {
        /// Description of the persistence failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an unexpected status error.
    #[inline]
    pub fn unexpected_status(status: u16) -> Self {
        Self::UnexpectedStatus { status }
    }

    /// Creates a consent store error.
    #[inline]
    pub fn consent_store(message: impl Into<String>) -> Self {
        Self::ConsentStore {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this failure is on the companion transport path.
    ///
    /// Transport failures trigger rollback of the optimistic dedup mark so
    /// the same (tab, URL) pair can retry on a later navigation.
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::UnexpectedStatus { .. } | Self::Http(_)
        )
    }

    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Url(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
