//! User-visible save confirmations.
//!
//! The only confirmation the core ever produces is a notification naming the
//! category the companion assigned to a saved visit. Actual delivery is the
//! host's concern: extension runtimes, desktops, and test harnesses all
//! surface notifications differently, so the tracker only hands a composed
//! [`Notification`] to whatever [`Notifier`] it was wired with.
//!
//! Nothing is shown for duplicates, consent denials, transport failures, or
//! `saved: false` responses.

// ============================================================================
// Imports
// ============================================================================

use tracing::info;

// ============================================================================
// Constants
// ============================================================================

/// Fixed notification title.
pub const NOTIFICATION_TITLE: &str = "Stacknote";

/// Fixed notification icon asset name.
pub const NOTIFICATION_ICON: &str = "icon.png";

// ============================================================================
// Notification
// ============================================================================

/// A composed save confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Fixed title ([`NOTIFICATION_TITLE`]).
    pub title: &'static str,

    /// Templated message naming the assigned category.
    pub message: String,

    /// Fixed icon asset name ([`NOTIFICATION_ICON`]).
    pub icon: &'static str,
}

impl Notification {
    /// Composes the confirmation for a saved visit.
    #[must_use]
    pub fn saved(category: &str) -> Self {
        Self {
            title: NOTIFICATION_TITLE,
            message: format!("Saved: {category}"),
            icon: NOTIFICATION_ICON,
        }
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Delivers composed notifications to the user.
///
/// Fire-and-forget: delivery failures are the implementation's problem and
/// must not surface back into the tracker.
pub trait Notifier: Send + Sync {
    /// Shows one notification.
    fn notify(&self, notification: &Notification);
}

// ============================================================================
// LogNotifier
// ============================================================================

/// Default notifier that emits through tracing.
///
/// Suitable for headless hosts and as a stand-in until the host wires its
/// own delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!(
            title = notification.title,
            message = %notification.message,
            "Notification"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
