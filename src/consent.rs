//! Consent gate backed by persisted storage.
//!
//! All tracking side effects are gated on a single persisted boolean. The
//! flag starts absent (not consented) and is set by an explicit user action;
//! no revoke operation exists. The tracker awaits
//! [`ConsentGate::is_granted`] before every report decision, so the flag is
//! re-read per event rather than cached.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConsentGate`] | Async read/grant trait |
//! | [`FileConsentStore`] | JSON document on disk |
//! | [`MemoryConsentGate`] | In-process flag for tests and embedded hosts |

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Error, Result};

// ============================================================================
// ConsentGate
// ============================================================================

/// Read/grant access to the persisted consent flag.
///
/// Reads are asynchronous relative to the caller and define no error
/// condition: an absent or unreadable store reads as "not consented".
#[async_trait]
pub trait ConsentGate: Send + Sync {
    /// Returns whether the user has consented to tracking.
    async fn is_granted(&self) -> bool;

    /// Records user consent.
    ///
    /// Invoked by an explicit user action outside the tracker core.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConsentStore`] if the flag cannot be persisted.
    async fn grant(&self) -> Result<()>;
}

// ============================================================================
// ConsentDocument
// ============================================================================

/// On-disk shape of the consent flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct ConsentDocument {
    /// The persisted flag. Key matches the extension storage name.
    #[serde(rename = "userConsent", default)]
    user_consent: bool,
}

// ============================================================================
// FileConsentStore
// ============================================================================

/// Consent flag persisted as a small JSON document.
///
/// # Example
///
/// ```no_run
/// use visit_tracker::{ConsentGate, FileConsentStore};
///
/// # async fn example() -> visit_tracker::Result<()> {
/// let store = FileConsentStore::new("/path/to/consent.json");
/// if !store.is_granted().await {
///     store.grant().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileConsentStore {
    /// Path of the JSON document.
    path: PathBuf,
}

impl FileConsentStore {
    /// Creates a store reading and writing the given path.
    ///
    /// The file does not need to exist; an absent file reads as "not
    /// consented".
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing document.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConsentGate for FileConsentStore {
    /// Reads the persisted flag.
    ///
    /// Absent file, unreadable file, and malformed JSON all read as `false`;
    /// the two failure shapes are logged since they are worth noticing but
    /// must not block the no-op path.
    async fn is_granted(&self) -> bool {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return false;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Consent store unreadable");
                return false;
            }
        };

        match serde_json::from_str::<ConsentDocument>(&content) {
            Ok(doc) => doc.user_consent,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Consent store malformed");
                false
            }
        }
    }

    /// Persists `userConsent: true`, creating parent directories as needed.
    async fn grant(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::consent_store(format!(
                    "Failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let doc = ConsentDocument { user_consent: true };
        let json = serde_json::to_string_pretty(&doc)?;

        fs::write(&self.path, json).await.map_err(|e| {
            Error::consent_store(format!("Failed to write {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), "Consent granted");
        Ok(())
    }
}

// ============================================================================
// MemoryConsentGate
// ============================================================================

/// In-process consent flag with no persistence.
///
/// Useful for tests and for hosts that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryConsentGate {
    granted: AtomicBool,
}

impl MemoryConsentGate {
    /// Creates a gate with consent not granted.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gate with consent already granted.
    #[inline]
    #[must_use]
    pub fn granted() -> Self {
        Self {
            granted: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl ConsentGate for MemoryConsentGate {
    async fn is_granted(&self) -> bool {
        self.granted.load(Ordering::Relaxed)
    }

    async fn grant(&self) -> Result<()> {
        self.granted.store(true, Ordering::Relaxed);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
