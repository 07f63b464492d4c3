//! Host visibility as an injected capability.
//!
//! The poll loop has no business knowing what "visible" means — a mobile
//! host maps it to app foreground state, a desktop host to window focus.
//! The host drives the sender side of a watch channel; the synchronizer
//! only observes the receiver handed to it in
//! [`crate::SyncOptions::visibility`]. No signal means always visible.

use tokio::sync::watch;

/// Receiver half of a visibility signal: `true` while the consumer's view
/// is foregrounded.
pub type VisibilitySignal = watch::Receiver<bool>;

/// Creates a visibility signal pair. The host keeps the sender and calls
/// `send(false)` / `send(true)` on background/foreground transitions.
#[must_use]
pub fn visibility_channel(initially_visible: bool) -> (watch::Sender<bool>, VisibilitySignal) {
    watch::channel(initially_visible)
}
