use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use serde_json::json;

use super::*;
use crate::visibility::visibility_channel;

fn automations(value: serde_json::Value) -> Vec<Automation> {
    serde_json::from_value(value).expect("test automations must deserialize")
}

fn renewals() -> Vec<Automation> {
    automations(json!([
        { "id": "a-1", "name": "Renewals", "isActive": true, "completedCalls": 4 }
    ]))
}

fn options(interval_ms: u64) -> SyncOptions {
    SyncOptions {
        interval: Duration::from_millis(interval_ms),
        ..SyncOptions::default()
    }
}

type BoxedFetch = std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Vec<Automation>>> + Send>>;

/// Counting fetcher that always returns the same collection.
fn fixed_fetcher(calls: &Arc<AtomicUsize>) -> impl Fn() -> BoxedFetch + Send + 'static {
    let calls = Arc::clone(calls);
    move || {
        let calls = Arc::clone(&calls);
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(renewals())
        })
    }
}

#[tokio::test(start_paused = true)]
async fn on_update_fires_once_for_identical_content() {
    let updates = Arc::new(AtomicUsize::new(0));
    let updates_cb = Arc::clone(&updates);
    let calls = Arc::new(AtomicUsize::new(0));

    let handle = Synchronizer::spawn(
        SyncOptions {
            on_update: Some(Box::new(move |_| {
                updates_cb.fetch_add(1, Ordering::SeqCst);
            })),
            ..options(100)
        },
        fixed_fetcher(&calls),
    );

    tokio::time::sleep(Duration::from_millis(550)).await;

    assert!(calls.load(Ordering::SeqCst) >= 3, "polling should keep going");
    assert_eq!(
        updates.load(Ordering::SeqCst),
        1,
        "identical content must notify exactly once"
    );

    let state = handle.current();
    assert_eq!(state.automations, renewals());
    assert!(!state.loading);
    assert!(state.last_updated.is_some());

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn empty_first_fetch_matches_the_initial_empty_state() {
    let updates = Arc::new(AtomicUsize::new(0));
    let updates_cb = Arc::clone(&updates);

    let handle = Synchronizer::spawn(
        SyncOptions {
            on_update: Some(Box::new(move |_| {
                updates_cb.fetch_add(1, Ordering::SeqCst);
            })),
            ..options(100)
        },
        || async { Ok(Vec::new()) },
    );

    tokio::time::sleep(Duration::from_millis(350)).await;

    assert_eq!(updates.load(Ordering::SeqCst), 0);
    let state = handle.current();
    assert!(state.automations.is_empty());
    assert!(!state.loading);
    assert_eq!(state.last_updated, None);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn watchers_are_not_woken_by_no_change_ticks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handle = Synchronizer::spawn(options(100), fixed_fetcher(&calls));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut rx = handle.subscribe();
    let _ = rx.borrow_and_update();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(
        !rx.has_changed().expect("loop should still be running"),
        "no-change ticks must not publish state"
    );

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn loading_clears_after_first_fetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handle = Synchronizer::spawn(options(100), fixed_fetcher(&calls));

    assert!(handle.current().loading);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!handle.current().loading);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_is_recorded_and_cleared_by_next_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetch_calls = Arc::clone(&calls);
    let fetch = move || {
        let n = fetch_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                Err(anyhow!("backend unavailable"))
            } else {
                Ok(renewals())
            }
        }
    };

    let handle = Synchronizer::spawn(options(100), fetch);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let state = handle.current();
    assert!(state.automations.is_empty());
    assert!(
        state
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("backend unavailable")),
        "failure must surface as last_error, got: {state:?}"
    );
    assert!(!state.loading);

    tokio::time::sleep(Duration::from_millis(150)).await;
    let state = handle.current();
    assert_eq!(state.automations, renewals());
    assert_eq!(state.last_error, None, "success must clear the error");
    assert!(state.last_updated.is_some());

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn persistent_failures_back_off_instead_of_hammering() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetch_calls = Arc::clone(&calls);
    let fetch = move || {
        fetch_calls.fetch_add(1, Ordering::SeqCst);
        async move { Err(anyhow!("still down")) }
    };

    let handle = Synchronizer::spawn(
        SyncOptions {
            backoff_cap: Duration::from_millis(400),
            ..options(100)
        },
        fetch,
    );

    tokio::time::sleep(Duration::from_millis(1150)).await;

    // Fixed-interval retry would make ~12 attempts; the schedule
    // 0, 100, 300, 700, 1100 (doubling, capped at 400ms) makes 5.
    let attempts = calls.load(Ordering::SeqCst);
    assert!(
        (4..=6).contains(&attempts),
        "expected backed-off retries, got {attempts} attempts"
    );

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn hidden_view_pauses_polling_and_resume_fetches_immediately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (vis_tx, vis_rx) = visibility_channel(true);

    let handle = Synchronizer::spawn(
        SyncOptions {
            visibility: Some(vis_rx),
            ..options(100)
        },
        fixed_fetcher(&calls),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    vis_tx.send(false).expect("loop should be subscribed");
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "no fetches while hidden"
    );

    vis_tx.send(true).expect("loop should be subscribed");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(
        calls.load(Ordering::SeqCst),
        2,
        "resume must fetch immediately"
    );

    // The resume fetch replaces the tick; the next one is a full interval out.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn initially_hidden_view_does_not_fetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (vis_tx, vis_rx) = visibility_channel(false);

    let handle = Synchronizer::spawn(
        SyncOptions {
            visibility: Some(vis_rx),
            ..options(100)
        },
        fixed_fetcher(&calls),
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    vis_tx.send(true).expect("loop should be subscribed");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn refresh_runs_a_cycle_without_waiting_for_the_timer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetch_calls = Arc::clone(&calls);
    let fetch = move || {
        let n = fetch_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let name = if n == 0 { "Before" } else { "After" };
            Ok(automations(json!([{ "id": "a-1", "name": name }])))
        }
    };

    // An hour-long interval: only refresh can explain a second fetch.
    let handle = Synchronizer::spawn(options(3_600_000), fetch);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.current().automations[0].name, "Before");

    handle.refresh().await;
    assert_eq!(handle.current().automations[0].name, "After");

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn refresh_works_while_hidden() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (_vis_tx, vis_rx) = visibility_channel(false);

    let handle = Synchronizer::spawn(
        SyncOptions {
            visibility: Some(vis_rx),
            ..options(100)
        },
        fixed_fetcher(&calls),
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    handle.refresh().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(handle.current().automations, renewals());

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn set_local_makes_a_confirming_fetch_a_no_op() {
    let updates = Arc::new(AtomicUsize::new(0));
    let updates_cb = Arc::clone(&updates);
    let calls = Arc::new(AtomicUsize::new(0));

    let handle = Synchronizer::spawn(
        SyncOptions {
            on_update: Some(Box::new(move |_| {
                updates_cb.fetch_add(1, Ordering::SeqCst);
            })),
            ..options(100)
        },
        fixed_fetcher(&calls),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(updates.load(Ordering::SeqCst), 1);

    // Optimistic local write of what the server will confirm.
    handle.set_local(renewals()).await;
    let state = handle.current();
    assert_eq!(state.automations, renewals());
    assert!(state.last_updated.is_some());

    // Confirming fetches carry identical content: no re-notification.
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(calls.load(Ordering::SeqCst) >= 3);
    assert_eq!(updates.load(Ordering::SeqCst), 1);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_abandons_an_in_flight_fetch() {
    let fetch = || async {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(renewals())
    };

    let handle = Synchronizer::spawn(options(100), fetch);
    tokio::time::sleep(Duration::from_millis(10)).await;

    // The fetch is asleep for an hour; stop must not wait for it, and its
    // late result must never be applied.
    let state = handle.current();
    handle.stop().await;
    assert!(state.automations.is_empty());
}

#[tokio::test(start_paused = true)]
async fn disabled_synchronizer_is_inert() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handle = Synchronizer::spawn(
        SyncOptions {
            enabled: false,
            ..options(100)
        },
        fixed_fetcher(&calls),
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let state = handle.current();
    assert!(!state.loading);
    assert!(state.automations.is_empty());

    // No-ops, but must not hang.
    handle.refresh().await;
    handle.set_local(renewals()).await;
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_ends_the_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handle = Synchronizer::spawn(options(100), fixed_fetcher(&calls));

    drop(handle);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(
        calls.load(Ordering::SeqCst) <= 1,
        "loop must end once the handle is gone"
    );
}
