//! Batch contact-import validation and dialing-queue estimation.
//!
//! [`validate_batch`] is the client-side half of a validation contract shared
//! with the server: it partitions a caller-supplied batch of raw records into
//! normalized contacts and a structured error list, using the same error
//! vocabulary the server emits for its deeper checks.

pub mod dates;
pub mod phone;
pub mod queue;
pub mod validator;

pub use phone::normalize_phone;
pub use queue::{
    estimate_queue_window, queue_timing_message, queue_timing_message_at, QueueEstimate,
    LARGE_BATCH_THRESHOLD,
};
pub use validator::{validate_batch, BatchOutcome, ValidateOptions};
