//! Type-safe identifiers for browser entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! # Example
//!
//! ```
//! use visit_tracker::TabId;
//!
//! let tab = TabId::new(5);
//! assert_eq!(tab.value(), 5);
//! assert_eq!(tab.to_string(), "5");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// TabId
// ============================================================================

/// Host-assigned tab identifier.
///
/// The browser assigns these integers and may reuse one after the owning tab
/// closes. The tracker therefore never keeps state for a closed tab: a
/// reused ID must look fresh (see [`crate::tracker::VisitTracker`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TabId(u32);

impl TabId {
    /// Creates a tab ID from the host-assigned integer.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying integer.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TabId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TabId> for u32 {
    #[inline]
    fn from(id: TabId) -> Self {
        id.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_id_roundtrip() {
        let id = TabId::new(42);
        assert_eq!(u32::from(id), 42);
        assert_eq!(TabId::from(42u32), id);
    }

    #[test]
    fn test_tab_id_display() {
        assert_eq!(TabId::new(7).to_string(), "7");
    }

    #[test]
    fn test_tab_id_serde_transparent() {
        let id = TabId::new(5);
        assert_eq!(serde_json::to_string(&id).unwrap(), "5");
        let back: TabId = serde_json::from_str("5").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_tab_id_is_copy_and_hash() {
        fn assert_copy<T: Copy + std::hash::Hash>() {}
        assert_copy::<TabId>();
    }
}
