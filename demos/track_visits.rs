//! Visit tracking demonstration.
//!
//! Demonstrates:
//! - Granting consent through a file-backed store
//! - Wiring a tracker to the HTTP reporter and log notifier
//! - Feeding synthetic tab events (navigation, duplicate, close, ID reuse)
//!
//! A companion must be listening on 127.0.0.1:8502 for the reports to be
//! saved; without one the tracker logs the transport failures and keeps the
//! pairs retryable.
//!
//! Usage:
//!   cargo run --example track_visits

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use visit_tracker::{
    ConsentGate, FileConsentStore, HttpReporter, LogNotifier, Result, TabId, VisitTracker,
};

// ============================================================================
// Constants
// ============================================================================

const URL_A: &str = "https://example.com/a";
const URL_B: &str = "https://example.com/b";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== Visit tracking demo ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    let consent_path = std::env::temp_dir().join("visit-tracker-demo/consent.json");
    let consent = Arc::new(FileConsentStore::new(&consent_path));

    println!("[Setup] Granting consent at {}", consent_path.display());
    consent.grant().await?;

    let tracker = VisitTracker::new(
        Arc::clone(&consent) as Arc<dyn ConsentGate>,
        Arc::new(HttpReporter::new()?),
        Arc::new(LogNotifier),
    );

    // ========================================================================
    // Synthetic tab lifecycle
    // ========================================================================

    let tab = TabId::new(5);

    println!("[1] Tab {tab} activates and loads {URL_A}");
    tracker.on_tab_activated(tab);
    tracker.on_navigation_complete(tab, URL_A, "Example A").await;

    println!("[2] Reloading the identical URL is suppressed as a duplicate");
    tracker.on_navigation_complete(tab, URL_A, "Example A").await;

    println!("[3] A second URL in the same tab is a fresh pair");
    tracker.on_navigation_complete(tab, URL_B, "Example B").await;
    println!("    marked pairs: {}", tracker.marked_count());

    println!("[4] Closing tab {tab} evicts its state");
    tracker.on_tab_closed(tab);
    println!("    marked pairs: {}", tracker.marked_count());

    println!("[5] The browser reuses tab ID {tab}; the pair is fresh again");
    tracker.on_navigation_complete(tab, URL_A, "Example A").await;

    println!("\nDone.");
    Ok(())
}
