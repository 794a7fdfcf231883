//! Visit tracking and dedup core for the Stacknote browser companion.
//!
//! This library implements the tracking side of a browser companion: it
//! observes tab lifecycle events, deduplicates repeated visits per
//! (tab, URL) pair, and forwards newly-seen URLs to a local companion
//! service for storage and categorization. On a confirmed save it surfaces
//! a user-visible notification naming the assigned category.
//!
//! # Architecture
//!
//! Two cooperating components behind explicit trait seams:
//!
//! - **Consent Gate** ([`ConsentGate`]): a persisted boolean, awaited before
//!   every report decision, that enables or disables all tracking side
//!   effects. Grant-only; absence means "not consented".
//! - **Visit Tracker** ([`VisitTracker`]): the sole decision-maker. Owns the
//!   per-tab dedup and dwell maps, marks pairs optimistically before
//!   dispatch, and rolls the mark back on transport failure so the pair can
//!   retry.
//!
//! Control flow: host tab event → consent check → dedup check → (if new)
//! outbound report → on confirmed save, a user-visible confirmation.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use visit_tracker::{
//!     FileConsentStore, HttpReporter, LogNotifier, TabEvent, TabId, VisitTracker,
//! };
//!
//! #[tokio::main]
//! async fn main() -> visit_tracker::Result<()> {
//!     let tracker = VisitTracker::new(
//!         Arc::new(FileConsentStore::new("consent.json")),
//!         Arc::new(HttpReporter::new()?),
//!         Arc::new(LogNotifier),
//!     );
//!
//!     // Wire to the host's tab event source; any interleaving is valid.
//!     tracker
//!         .on_event(TabEvent::NavigationComplete {
//!             tab_id: TabId::new(5),
//!             url: "https://example.com/a".into(),
//!             title: "Example".into(),
//!         })
//!         .await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`consent`] | Consent gate: trait + file-backed and in-memory stores |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`event`] | Tab lifecycle event types |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`notify`] | User-visible save confirmations |
//! | [`report`] | Companion wire contract and HTTP reporter |
//! | [`tracker`] | The visit tracker itself |
//!
//! # Guarantees (and non-guarantees)
//!
//! - At most one in-flight report per (tab, URL) pair; duplicates are
//!   suppressed while the mark is present.
//! - A failed report leaves the pair retryable on a later navigation.
//! - Closing a tab evicts all of its state, so a reused tab ID is fresh.
//! - No delivery guarantee, no ordering across restarts, no persistence of
//!   the bookkeeping maps beyond the process.

// ============================================================================
// Modules
// ============================================================================

/// Consent gate backed by persisted storage.
pub mod consent;

/// Error types and result aliases.
pub mod error;

/// Tab lifecycle event types.
pub mod event;

/// Type-safe identifiers for browser entities.
pub mod identifiers;

/// User-visible save confirmations.
pub mod notify;

/// Outbound visit reports to the companion service.
pub mod report;

/// Visit tracking and dedup core.
pub mod tracker;

// ============================================================================
// Re-exports
// ============================================================================

// Consent types
pub use consent::{ConsentGate, FileConsentStore, MemoryConsentGate};

// Error types
pub use error::{Error, Result};

// Event types
pub use event::TabEvent;

// Identifier types
pub use identifiers::TabId;

// Notification types
pub use notify::{LogNotifier, Notification, Notifier};

// Report types
pub use report::{HttpReporter, HttpReporterBuilder, SaveOutcome, VisitReport, VisitReporter};

// Tracker types
pub use tracker::{SERIOUS_VIEW_THRESHOLD, VisitTracker};
