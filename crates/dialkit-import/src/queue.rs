//! Dialing-queue time estimation.
//!
//! Pure helpers the import flow uses to warn about large batches before the
//! caller commits them. The effective dial rate is the configured
//! calls-per-second capped by the concurrency limit: a dialer cannot place
//! more calls per second than it has lines.

/// Batch size above which [`queue_timing_message`] starts advising.
/// The boundary is strictly greater-than.
pub const LARGE_BATCH_THRESHOLD: u64 = 300;

/// An estimated completion window for dialing a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEstimate {
    /// Total estimated seconds, rounded up.
    pub seconds: u64,
    /// `seconds` expressed in whole minutes, rounded up.
    pub minutes: u64,
    /// Populated only when the window reaches a full hour.
    pub hours: Option<u64>,
}

impl QueueEstimate {
    /// Short human-readable rendering, scaled to the window's magnitude.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.hours {
            Some(hours) => format!("about {hours}h ({} min)", self.minutes),
            None if self.seconds >= 60 => format!("about {} min", self.minutes),
            None => format!("about {}s", self.seconds),
        }
    }
}

/// Estimates how long a batch of `contacts` takes to dial at
/// `calls_per_second`, capped by `max_concurrency`.
///
/// A zero rate or zero concurrency yields a zero window; callers should
/// treat that as "no estimate available" rather than "instant".
#[must_use]
pub fn estimate_queue_window(
    contacts: u64,
    calls_per_second: u64,
    max_concurrency: u64,
) -> QueueEstimate {
    let rate = calls_per_second.min(max_concurrency);
    if contacts == 0 || rate == 0 {
        return QueueEstimate {
            seconds: 0,
            minutes: 0,
            hours: None,
        };
    }

    let seconds = contacts.div_ceil(rate);
    let minutes = seconds.div_ceil(60);
    let hours = if minutes >= 60 {
        Some(minutes.div_ceil(60))
    } else {
        None
    };

    QueueEstimate {
        seconds,
        minutes,
        hours,
    }
}

/// Advisory shown for batches larger than [`LARGE_BATCH_THRESHOLD`].
#[must_use]
pub fn queue_timing_message(contacts: u64) -> Option<String> {
    queue_timing_message_at(contacts, LARGE_BATCH_THRESHOLD)
}

/// Advisory with a caller-chosen threshold. `None` at or below the
/// threshold.
#[must_use]
pub fn queue_timing_message_at(contacts: u64, threshold: u64) -> Option<String> {
    if contacts > threshold {
        Some(format!(
            "{contacts} contacts will be queued and dialed in waves; \
             expect calls to start over several minutes rather than all at once"
        ))
    } else {
        None
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod queue_test;
