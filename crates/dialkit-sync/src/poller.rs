//! The polling synchronizer: a background loop that keeps a local copy of a
//! remotely-fetched collection fresh, and only tells consumers about fetches
//! that actually changed something.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use dialkit_core::Automation;

use crate::fingerprint::fingerprint;
use crate::visibility::VisibilitySignal;

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Default ceiling on the failure backoff.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(60);

/// Callback invoked with the new collection when a poll detects change.
/// Never invoked for a no-change tick.
pub type UpdateFn = Box<dyn Fn(&[Automation]) + Send + Sync>;

/// Configuration for [`Synchronizer::spawn`].
pub struct SyncOptions {
    /// When false, no poll loop is started and the returned handle is inert.
    pub enabled: bool,
    pub interval: Duration,
    /// Ceiling on the exponential backoff applied after consecutive fetch
    /// failures. A success resets to the base cadence.
    pub backoff_cap: Duration,
    /// Host visibility signal; absent means always visible.
    pub visibility: Option<VisibilitySignal>,
    pub on_update: Option<UpdateFn>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: DEFAULT_POLL_INTERVAL,
            backoff_cap: DEFAULT_BACKOFF_CAP,
            visibility: None,
            on_update: None,
        }
    }
}

impl std::fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOptions")
            .field("enabled", &self.enabled)
            .field("interval", &self.interval)
            .field("backoff_cap", &self.backoff_cap)
            .field("visibility", &self.visibility.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

/// Consumer-visible synchronizer state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    /// Last accepted collection, in server order.
    pub automations: Vec<Automation>,
    /// True from spawn until the first fetch settles.
    pub loading: bool,
    /// Message from the most recent failed fetch; cleared by the next
    /// success.
    pub last_error: Option<String>,
    /// When the collection last changed (including local optimistic sets).
    pub last_updated: Option<DateTime<Utc>>,
}

enum Command {
    Refresh(oneshot::Sender<()>),
    SetLocal(Vec<Automation>),
}

/// Spawns poll loops. See [`Synchronizer::spawn`].
pub struct Synchronizer;

impl Synchronizer {
    /// Starts a poll loop over the injected `fetch` operation and returns the
    /// consumer handle.
    ///
    /// The loop performs an immediate first fetch, then one fetch per
    /// interval while visible. Fetches are awaited inline and missed ticks
    /// are delayed, so one instance never has two fetches in flight.
    ///
    /// With `enabled` false nothing is spawned: the handle reports the
    /// initial empty state and its operations are no-ops.
    pub fn spawn<F, Fut>(options: SyncOptions, fetch: F) -> SyncHandle
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Vec<Automation>>> + Send + 'static,
    {
        let SyncOptions {
            enabled,
            interval,
            backoff_cap,
            visibility,
            on_update,
        } = options;

        let (state_tx, state_rx) = watch::channel(SyncState {
            loading: enabled,
            ..SyncState::default()
        });
        let (command_tx, command_rx) = mpsc::channel(16);
        let stop = Arc::new(Notify::new());

        if !enabled {
            // command_rx drops here, so handle operations become no-ops.
            return SyncHandle {
                state_rx,
                commands: command_tx,
                stop,
                task: None,
            };
        }

        let poll = PollLoop {
            fetch,
            interval,
            backoff_cap,
            on_update,
            state_tx,
            stop: Arc::clone(&stop),
            // Seed with the empty collection's fingerprint: a first fetch
            // that returns nothing matches the initial empty state and is
            // not an update.
            last_fingerprint: Some(fingerprint(&[])),
            consecutive_failures: 0,
            suppressed_until: None,
            stopped: false,
            _marker: std::marker::PhantomData,
        };
        let task = tokio::spawn(run(poll, command_rx, visibility));

        SyncHandle {
            state_rx,
            commands: command_tx,
            stop,
            task: Some(task),
        }
    }
}

/// Owner handle for one synchronizer instance.
///
/// Dropping the handle ends the loop at its next turn; [`SyncHandle::stop`]
/// ends it promptly, abandoning any in-flight fetch.
pub struct SyncHandle {
    state_rx: watch::Receiver<SyncState>,
    commands: mpsc::Sender<Command>,
    stop: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> SyncState {
        self.state_rx.borrow().clone()
    }

    /// A receiver that observes every accepted state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state_rx.clone()
    }

    /// Runs one fetch-and-diff cycle now, regardless of timer phase,
    /// visibility, or backoff, and completes once the result is applied.
    ///
    /// Used after local mutations for near-immediate consistency instead of
    /// waiting for the next tick. No-op on a stopped or disabled instance.
    pub async fn refresh(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.commands.send(Command::Refresh(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Optimistically replaces the local collection ahead of server
    /// confirmation. The stored fingerprint follows the new collection, so
    /// a confirming fetch of identical content does not re-notify.
    pub async fn set_local(&self, automations: Vec<Automation>) {
        let _ = self.commands.send(Command::SetLocal(automations)).await;
    }

    /// Stops the loop and waits for it to finish. An in-flight fetch is
    /// abandoned; its result is never applied.
    pub async fn stop(mut self) {
        self.stop.notify_one();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

struct PollLoop<F, Fut> {
    fetch: F,
    interval: Duration,
    backoff_cap: Duration,
    on_update: Option<UpdateFn>,
    state_tx: watch::Sender<SyncState>,
    stop: Arc<Notify>,
    last_fingerprint: Option<String>,
    consecutive_failures: u32,
    // Earliest instant the next scheduled fetch may run; set by failures.
    suppressed_until: Option<Instant>,
    stopped: bool,
    _marker: std::marker::PhantomData<Fut>,
}

async fn run<F, Fut>(
    mut poll: PollLoop<F, Fut>,
    mut commands: mpsc::Receiver<Command>,
    mut visibility: Option<VisibilitySignal>,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<Automation>>>,
{
    let mut ticker = tokio::time::interval(poll.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let stop = Arc::clone(&poll.stop);
    let mut visible = visibility.as_ref().is_none_or(|rx| *rx.borrow());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if visible && poll.past_backoff() {
                    poll.cycle().await;
                }
            }
            changed = visibility_changed(&mut visibility) => {
                match changed {
                    Some(now_visible) => {
                        let was_visible = visible;
                        visible = now_visible;
                        if now_visible && !was_visible {
                            // Resume fetches immediately, then rejoin the
                            // cadence relative to the resume fetch.
                            poll.cycle().await;
                            ticker.reset();
                        }
                    }
                    // Host dropped its sender: hold the last known
                    // visibility and stop selecting on the signal.
                    None => visibility = None,
                }
            }
            cmd = commands.recv() => match cmd {
                Some(Command::Refresh(ack)) => {
                    poll.cycle().await;
                    let _ = ack.send(());
                }
                Some(Command::SetLocal(automations)) => poll.set_local(automations),
                None => break,
            },
            () = stop.notified() => break,
        }

        if poll.stopped {
            break;
        }
    }

    tracing::debug!("automation poll loop stopped");
}

async fn visibility_changed(signal: &mut Option<VisibilitySignal>) -> Option<bool> {
    match signal {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(*rx.borrow()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

impl<F, Fut> PollLoop<F, Fut>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<Automation>>>,
{
    fn past_backoff(&self) -> bool {
        self.suppressed_until
            .is_none_or(|until| Instant::now() >= until)
    }

    /// One fetch-and-diff cycle. A stop arriving mid-fetch abandons the
    /// fetch; an abandoned result is never applied.
    async fn cycle(&mut self) {
        let fetched = tokio::select! {
            result = (self.fetch)() => result,
            () = self.stop.notified() => {
                self.stopped = true;
                return;
            }
        };
        self.apply(fetched);
    }

    fn apply(&mut self, result: anyhow::Result<Vec<Automation>>) {
        match result {
            Ok(automations) => {
                self.consecutive_failures = 0;
                self.suppressed_until = None;

                let print = fingerprint(&automations);
                if self.last_fingerprint.as_deref() == Some(print.as_str()) {
                    // No meaningful change: clear transient flags only, and
                    // only notify watchers if one of them actually flips.
                    self.state_tx.send_if_modified(|state| {
                        let mut modified = false;
                        if state.loading {
                            state.loading = false;
                            modified = true;
                        }
                        if state.last_error.is_some() {
                            state.last_error = None;
                            modified = true;
                        }
                        modified
                    });
                    return;
                }

                self.last_fingerprint = Some(print);
                if let Some(on_update) = &self.on_update {
                    on_update(&automations);
                }
                self.state_tx.send_if_modified(|state| {
                    state.automations = automations;
                    state.loading = false;
                    state.last_error = None;
                    state.last_updated = Some(Utc::now());
                    true
                });
            }
            Err(error) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                // First failure retries at the next tick; repeats back off
                // exponentially up to the cap.
                if self.consecutive_failures > 1 {
                    let delay =
                        backoff_delay(self.interval, self.consecutive_failures, self.backoff_cap);
                    self.suppressed_until = Some(Instant::now() + delay);
                    tracing::warn!(
                        failures = self.consecutive_failures,
                        retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "automation poll failed; backing off"
                    );
                } else {
                    tracing::warn!(error = %error, "automation poll failed");
                }
                self.state_tx.send_if_modified(|state| {
                    state.loading = false;
                    state.last_error = Some(error.to_string());
                    true
                });
            }
        }
    }

    fn set_local(&mut self, automations: Vec<Automation>) {
        self.last_fingerprint = Some(fingerprint(&automations));
        self.state_tx.send_if_modified(|state| {
            state.automations = automations;
            state.last_updated = Some(Utc::now());
            true
        });
    }
}

fn backoff_delay(interval: Duration, failures: u32, cap: Duration) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    interval.saturating_mul(1u32 << exponent).min(cap)
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;
