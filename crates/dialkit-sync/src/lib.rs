//! Change-detected polling synchronization for automation collections.
//!
//! A [`Synchronizer`] owns a background poll loop that fetches the remote
//! collection on an interval, fingerprints the change-relevant fields, and
//! only publishes to consumers when the fingerprint moves. Consumers hold a
//! [`SyncHandle`]: a state snapshot/subscription, a manual refresh, an
//! optimistic local setter, and a stop that releases the timer on every
//! exit path.

pub mod fingerprint;
pub mod poller;
pub mod visibility;

pub use fingerprint::fingerprint;
pub use poller::{SyncHandle, SyncOptions, SyncState, Synchronizer};
pub use visibility::{visibility_channel, VisibilitySignal};
