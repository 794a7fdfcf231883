//! Outbound visit reports to the companion service.
//!
//! The companion is an opaque local process that stores and categorizes
//! reported URLs. The entire contract is one request type:
//!
//! ```json
//! POST /api/add-url
//! { "url": "...", "title": "...", "timestamp": "2026-08-29T12:00:00.000Z" }
//! ```
//!
//! with the response
//!
//! ```json
//! { "saved": true, "category": "tech" }
//! ```
//!
//! No authentication, no retry-with-backoff, no idempotency key beyond the
//! caller-side dedup in [`crate::tracker`].
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`VisitReport`] | Request body |
//! | [`SaveOutcome`] | Response body |
//! | [`VisitReporter`] | Dispatch trait |
//! | [`HttpReporter`] | reqwest-backed implementation |

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default companion port (local only).
pub const DEFAULT_PORT: u16 = 8502;

/// Report endpoint path on the companion.
pub const REPORT_PATH: &str = "/api/add-url";

/// Default bounded wait for a report. A timeout is a transport failure and
/// takes the caller's rollback path, so a hung companion cannot pin the
/// optimistic dedup mark forever.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// VisitReport
// ============================================================================

/// A single visit report sent to the companion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitReport {
    /// The visited page's URL.
    pub url: String,

    /// The visited page's title.
    pub title: String,

    /// ISO-8601 timestamp captured at dispatch time.
    pub timestamp: String,
}

impl VisitReport {
    /// Creates a report with the timestamp captured now.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// ============================================================================
// SaveOutcome
// ============================================================================

/// The companion's verdict on a reported visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// Whether the companion saved the visit.
    pub saved: bool,

    /// The assigned category. Presented to the user only when `saved` is
    /// true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SaveOutcome {
    /// Returns the category when the visit was saved.
    #[inline]
    #[must_use]
    pub fn saved_category(&self) -> Option<&str> {
        if self.saved {
            self.category.as_deref()
        } else {
            None
        }
    }
}

// ============================================================================
// VisitReporter
// ============================================================================

/// Dispatches visit reports to the companion.
///
/// Implementations must treat any transport-level failure as an `Err` whose
/// [`is_transport`](Error::is_transport) holds; the tracker keys its
/// rollback behavior off the `Err` path, never off `saved: false`.
#[async_trait]
pub trait VisitReporter: Send + Sync {
    /// Sends one report and returns the companion's verdict.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] if the companion is unreachable, times out, or
    ///   returns a malformed body
    /// - [`Error::UnexpectedStatus`] if it responds with a non-2xx status
    async fn report(&self, report: &VisitReport) -> Result<SaveOutcome>;
}

// ============================================================================
// HttpReporter
// ============================================================================

/// reqwest-backed reporter posting to the fixed local endpoint.
///
/// # Example
///
/// ```no_run
/// use visit_tracker::HttpReporter;
///
/// # fn example() -> visit_tracker::Result<()> {
/// let reporter = HttpReporter::builder()
///     .port(8502)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpReporter {
    /// Shared HTTP client with the bounded request timeout.
    client: Client,
    /// Full report endpoint URL.
    endpoint: Url,
}

impl HttpReporter {
    /// Creates a reporter with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Returns a builder for custom configuration.
    #[inline]
    #[must_use]
    pub fn builder() -> HttpReporterBuilder {
        HttpReporterBuilder::new()
    }

    /// Returns the configured endpoint URL.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl VisitReporter for HttpReporter {
    async fn report(&self, report: &VisitReport) -> Result<SaveOutcome> {
        trace!(url = %report.url, "Dispatching visit report");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::unexpected_status(status.as_u16()));
        }

        let outcome: SaveOutcome = response.json().await?;
        debug!(
            url = %report.url,
            saved = outcome.saved,
            category = outcome.category.as_deref().unwrap_or(""),
            "Companion responded"
        );
        Ok(outcome)
    }
}

// ============================================================================
// HttpReporterBuilder
// ============================================================================

/// Builder for configuring an [`HttpReporter`].
#[derive(Debug, Clone)]
pub struct HttpReporterBuilder {
    /// Companion port on localhost.
    port: u16,
    /// Full endpoint override; wins over `port` when set.
    endpoint: Option<String>,
    /// Request timeout.
    timeout: Duration,
}

impl Default for HttpReporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpReporterBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT,
            endpoint: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the companion port on localhost.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a full endpoint URL, replacing the localhost default.
    ///
    /// Intended for tests pointing at an ephemeral server.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the bounded request timeout.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the reporter with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the endpoint does not parse
    /// - [`Error::Config`] if the endpoint scheme is not http(s) or the
    ///   timeout is zero
    /// - [`Error::Http`] if the HTTP client cannot be constructed
    pub fn build(self) -> Result<HttpReporter> {
        if self.timeout.is_zero() {
            return Err(Error::config("Request timeout must be non-zero"));
        }

        let endpoint = match self.endpoint {
            Some(raw) => Url::parse(&raw)?,
            None => Url::parse(&format!("http://127.0.0.1:{}{REPORT_PATH}", self.port))?,
        };

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Unsupported endpoint scheme: {}",
                endpoint.scheme()
            )));
        }

        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(HttpReporter { client, endpoint })
    }
}

// ============================================================================
// Tests
// ============================================================================
