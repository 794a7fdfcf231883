//! Tab lifecycle event types.
//!
//! Events are notifications from the host browser environment about tab
//! activity. The tracker does not subscribe to anything itself: whatever
//! event source the host provides (extension runtime, automation driver,
//! test harness) parses its native payloads into [`TabEvent`] values and
//! feeds them to [`VisitTracker::on_event`](crate::tracker::VisitTracker::on_event).
//!
//! # Event Types
//!
//! | Variant | Host trigger |
//! |---------|--------------|
//! | [`TabEvent::NavigationComplete`] | tab updated to "load complete" with a known URL |
//! | [`TabEvent::Activated`] | tab became the foregrounded/active tab |
//! | [`TabEvent::Removed`] | tab closed |

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::TabId;

// ============================================================================
// TabEvent
// ============================================================================

/// A tab lifecycle event from the host environment.
///
/// The tracker enforces no ordering between these beyond what the browser
/// itself guarantees; any interleaving is valid input, including a
/// [`Removed`](TabEvent::Removed) for a tab that was never activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// A page finished loading in a tab.
    NavigationComplete {
        /// Tab the navigation happened in.
        tab_id: TabId,
        /// The loaded page's URL.
        url: String,
        /// The loaded page's title.
        title: String,
    },

    /// A tab became the active (foregrounded) tab.
    Activated {
        /// The newly active tab.
        tab_id: TabId,
    },

    /// A tab was closed.
    Removed {
        /// The closed tab.
        tab_id: TabId,
    },
}

impl TabEvent {
    /// Returns the tab this event belongs to.
    #[inline]
    #[must_use]
    pub fn tab_id(&self) -> TabId {
        match self {
            Self::NavigationComplete { tab_id, .. }
            | Self::Activated { tab_id }
            | Self::Removed { tab_id } => *tab_id,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
