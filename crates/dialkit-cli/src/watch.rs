//! Watch command: run the synchronizer against the backend and print a line
//! per detected change.

use std::sync::Arc;
use std::time::Duration;

use dialkit_api::ApiClient;
use dialkit_core::{load_app_config, Automation};
use dialkit_sync::{SyncOptions, Synchronizer};

pub(crate) async fn run_watch(interval_ms: Option<u64>, once: bool) -> anyhow::Result<()> {
    let config = load_app_config()?;
    let client = Arc::new(ApiClient::new(&config)?);

    if once {
        let automations = client.list_automations().await?;
        print_collection(&automations);
        return Ok(());
    }

    let interval = Duration::from_millis(interval_ms.unwrap_or(config.poll_interval_ms));
    let fetch_client = Arc::clone(&client);
    let fetch = move || {
        let client = Arc::clone(&fetch_client);
        async move { Ok(client.list_automations().await?) }
    };

    let handle = Synchronizer::spawn(
        SyncOptions {
            interval,
            backoff_cap: Duration::from_secs(config.poll_backoff_cap_secs),
            on_update: Some(Box::new(|automations: &[Automation]| {
                print_collection(automations);
            })),
            ..SyncOptions::default()
        },
        fetch,
    );

    println!(
        "watching automations every {}ms; press Ctrl-C to stop",
        interval.as_millis()
    );
    tokio::signal::ctrl_c().await?;

    if let Some(error) = handle.current().last_error {
        tracing::warn!(error = %error, "most recent poll attempt had failed");
    }
    handle.stop().await;
    Ok(())
}

fn print_collection(automations: &[Automation]) {
    println!(
        "{} automation(s) @ {}",
        automations.len(),
        chrono::Utc::now().format("%H:%M:%S")
    );
    for automation in automations {
        let id = automation.canonical_id().unwrap_or("-");
        let status = if automation.is_active { "active" } else { "paused" };
        let progress = match (automation.completed_calls, automation.total_contacts) {
            (Some(done), Some(total)) => format!(" {done}/{total}"),
            _ => String::new(),
        };
        println!("  {id}  {status}{progress}  {}", automation.name);
    }
}
