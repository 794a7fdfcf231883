//! Visit tracking and dedup core.
//!
//! [`VisitTracker`] is the sole decision-maker for whether a tab navigation
//! produces an outbound report, and the exclusive owner of the two
//! bookkeeping maps:
//!
//! - **sent visits**: per-tab set of URLs already reported this session
//! - **active-tab starts**: per-tab timestamp of the last activation
//!
//! Both maps are bounded by the number of currently open tabs; closing a tab
//! evicts its entries from both.
//!
//! # Concurrency
//!
//! Handlers take `&self` and may run interleaved on a cooperative event
//! loop. The maps sit behind [`parking_lot::Mutex`] and a lock is never held
//! across an `.await`, so a handler that suspends (consent read, outbound
//! report) can be overtaken by other events without observing a torn map.
//! The dedup mark is placed optimistically *before* the report is dispatched
//! and rolled back on transport failure: a duplicate navigation arriving
//! while the first report is still in flight sees the mark and suppresses
//! itself, and a failed report leaves the pair retryable.
//!
//! # Error containment
//!
//! Handlers return nothing. Consent denial and duplicate suppression are
//! defined silent no-ops; transport failures are recoverable (the companion
//! may simply not be running) and are logged at debug, never propagated.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::consent::ConsentGate;
use crate::event::TabEvent;
use crate::identifiers::TabId;
use crate::notify::{Notification, Notifier};
use crate::report::{VisitReport, VisitReporter};

// ============================================================================
// Constants
// ============================================================================

/// Dwell duration above which a closed tab counts as seriously viewed.
///
/// Strictly greater-than: a dwell of exactly 30 s is not serious.
pub const SERIOUS_VIEW_THRESHOLD: Duration = Duration::from_secs(30);

// ============================================================================
// Types
// ============================================================================

/// URLs already reported, keyed by owning tab.
///
/// Keyed by tab (rather than by a flat `tab-url` composite) so that closing
/// a tab evicts every URL recorded under it. The dedup identity is still the
/// (tab, URL) pair.
type SentVisits = FxHashMap<TabId, FxHashSet<String>>;

/// Last activation instant per tab.
type ActiveTabStarts = FxHashMap<TabId, Instant>;

// ============================================================================
// VisitTracker
// ============================================================================

/// Reactive visit tracker.
///
/// One live instance per extension process; constructed at process start
/// with its three collaborators and dropped at process end. Handlers are
/// wired to whatever tab event source the host environment provides.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use visit_tracker::{
///     HttpReporter, LogNotifier, MemoryConsentGate, TabId, VisitTracker,
/// };
///
/// # async fn example() -> visit_tracker::Result<()> {
/// let tracker = VisitTracker::new(
///     Arc::new(MemoryConsentGate::granted()),
///     Arc::new(HttpReporter::new()?),
///     Arc::new(LogNotifier),
/// );
///
/// tracker.on_tab_activated(TabId::new(5));
/// tracker
///     .on_navigation_complete(TabId::new(5), "https://example.com/a", "Example")
///     .await;
/// tracker.on_tab_closed(TabId::new(5));
/// # Ok(())
/// # }
/// ```
pub struct VisitTracker {
    /// Consent flag, re-read before every report decision.
    consent: Arc<dyn ConsentGate>,
    /// Outbound report dispatch.
    reporter: Arc<dyn VisitReporter>,
    /// User-visible save confirmations.
    notifier: Arc<dyn Notifier>,
    /// Sent-visit record.
    sent: Mutex<SentVisits>,
    /// Active-tab-start record.
    active_since: Mutex<ActiveTabStarts>,
}

impl VisitTracker {
    /// Creates a tracker with empty bookkeeping maps.
    #[must_use]
    pub fn new(
        consent: Arc<dyn ConsentGate>,
        reporter: Arc<dyn VisitReporter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            consent,
            reporter,
            notifier,
            sent: Mutex::new(SentVisits::default()),
            active_since: Mutex::new(ActiveTabStarts::default()),
        }
    }

    /// Returns whether a dwell duration counts as seriously viewed.
    #[inline]
    #[must_use]
    pub const fn seriously_viewed(dwell: Duration) -> bool {
        dwell.as_millis() > SERIOUS_VIEW_THRESHOLD.as_millis()
    }
}

// ============================================================================
// VisitTracker - Handlers
// ============================================================================

impl VisitTracker {
    /// Dispatches a host event to the matching handler.
    pub async fn on_event(&self, event: TabEvent) {
        match event {
            TabEvent::NavigationComplete { tab_id, url, title } => {
                self.on_navigation_complete(tab_id, &url, &title).await;
            }
            TabEvent::Activated { tab_id } => self.on_tab_activated(tab_id),
            TabEvent::Removed { tab_id } => self.on_tab_closed(tab_id),
        }
    }

    /// Reacts to a tab finishing a page load.
    ///
    /// Consent is awaited first; without it this is a silent no-op. A pair
    /// already marked as sent is suppressed as a duplicate. Otherwise the
    /// pair is marked before dispatch and the report is sent; on a confirmed
    /// save the user is notified with the assigned category, and on
    /// transport failure the mark is rolled back so a later navigation to
    /// the same pair can retry.
    pub async fn on_navigation_complete(&self, tab_id: TabId, url: &str, title: &str) {
        if !self.consent.is_granted().await {
            trace!(tab_id = %tab_id, "Tracking not consented");
            return;
        }

        // Optimistic mark before dispatch. A second navigation to the same
        // pair arriving while the report is in flight sees the mark.
        {
            let mut sent = self.sent.lock();
            if !sent.entry(tab_id).or_default().insert(url.to_string()) {
                debug!(tab_id = %tab_id, url = %url, "Duplicate visit suppressed");
                return;
            }
        }

        let report = VisitReport::new(url, title);
        match self.reporter.report(&report).await {
            Ok(outcome) => {
                if let Some(category) = outcome.saved_category() {
                    self.notifier.notify(&Notification::saved(category));
                } else if outcome.saved {
                    debug!(tab_id = %tab_id, url = %url, "Saved without category");
                } else {
                    // saved:false keeps the mark; the pair is settled for
                    // this session and will not retry.
                    debug!(tab_id = %tab_id, url = %url, "Companion declined to save");
                }
            }
            Err(e) => {
                debug!(
                    tab_id = %tab_id,
                    url = %url,
                    error = %e,
                    "Report failed, mark rolled back"
                );
                self.rollback(tab_id, url);
            }
        }
    }

    /// Reacts to a tab becoming the active tab.
    ///
    /// Overwrites any prior activation timestamp for the tab.
    pub fn on_tab_activated(&self, tab_id: TabId) {
        self.active_since.lock().insert(tab_id, Instant::now());
        trace!(tab_id = %tab_id, "Tab activated");
    }

    /// Reacts to a tab closing.
    ///
    /// Evicts the tab from both maps. A tab ID the browser later reuses is
    /// fresh: no dedup state carries over. The dwell duration, when an
    /// activation was recorded, is surfaced as a diagnostic observation
    /// only.
    pub fn on_tab_closed(&self, tab_id: TabId) {
        let evicted_urls = self
            .sent
            .lock()
            .remove(&tab_id)
            .map_or(0, |urls| urls.len());

        let dwell = self
            .active_since
            .lock()
            .remove(&tab_id)
            .map(|since| since.elapsed());

        if let Some(dwell) = dwell
            && Self::seriously_viewed(dwell)
        {
            debug!(
                tab_id = %tab_id,
                dwell_ms = dwell.as_millis() as u64,
                "Tab closed after serious viewing"
            );
        }

        trace!(tab_id = %tab_id, evicted_urls, "Tab state evicted");
    }
}

// ============================================================================
// VisitTracker - Internal
// ============================================================================

impl VisitTracker {
    /// Removes an optimistic mark after a failed report.
    ///
    /// Idempotent: rolling back a pair whose tab already closed (report
    /// completed after eviction) finds nothing to remove.
    fn rollback(&self, tab_id: TabId, url: &str) {
        let mut sent = self.sent.lock();
        if let Some(urls) = sent.get_mut(&tab_id) {
            urls.remove(url);
            if urls.is_empty() {
                sent.remove(&tab_id);
            }
        }
    }

    /// Back-dates a tab's activation for dwell tests.
    #[cfg(test)]
    fn set_activation(&self, tab_id: TabId, since: Instant) {
        self.active_since.lock().insert(tab_id, since);
    }
}

// ============================================================================
// VisitTracker - Accessors
// ============================================================================

impl VisitTracker {
    /// Returns whether a (tab, URL) pair is currently marked as sent.
    #[must_use]
    pub fn is_marked(&self, tab_id: TabId, url: &str) -> bool {
        self.sent
            .lock()
            .get(&tab_id)
            .is_some_and(|urls| urls.contains(url))
    }

    /// Returns the total number of marked (tab, URL) pairs.
    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.sent.lock().values().map(FxHashSet::len).sum()
    }

    /// Returns the number of tabs with a recorded activation.
    #[must_use]
    pub fn active_tab_count(&self) -> usize {
        self.active_since.lock().len()
    }
}

// ============================================================================
// Tests
// ============================================================================
