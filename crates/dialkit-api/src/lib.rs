//! HTTP client for the dialkit backend.
//!
//! Wraps `reqwest` with typed error mapping, bearer-key auth, and
//! exponential-backoff retries on transient failures. Endpoint coverage is
//! the two surfaces the client data layer needs: listing automations (the
//! polled collection) and submitting validated contact batches.

pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{AutomationsResponse, ImportReceipt, RejectedContact};
