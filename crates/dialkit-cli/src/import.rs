//! Import command handlers.
//!
//! Validation runs entirely locally; `--push` additionally submits the valid
//! contacts and folds the server's rejections into the report, so the exit
//! status reflects both halves of the shared validation contract.

use std::path::{Path, PathBuf};

use anyhow::Context;
use uuid::Uuid;

use dialkit_api::{ApiClient, RejectedContact};
use dialkit_core::{load_app_config, RawContact};
use dialkit_import::{
    estimate_queue_window, queue_timing_message, validate_batch, BatchOutcome, ValidateOptions,
};

pub(crate) struct ValidateArgs {
    pub file: PathBuf,
    pub require_reference_date: bool,
    pub reference_date_field: String,
    pub json: bool,
    pub push: bool,
}

/// Validate (and optionally push) a batch file. Returns `true` when every
/// record passed locally and, with `--push`, server-side too.
pub(crate) async fn run_validate(args: &ValidateArgs) -> anyhow::Result<bool> {
    let records = load_records(&args.file)?;
    let options = ValidateOptions {
        require_reference_date: args.require_reference_date,
        reference_date_field: args.reference_date_field.clone(),
    };
    let outcome = validate_batch(&records, &options);
    let batch_id = Uuid::new_v4();

    let mut server_rejections: Vec<RejectedContact> = Vec::new();
    if args.push && !outcome.valid.is_empty() {
        let config = load_app_config()?;
        let client = ApiClient::new(&config)?;
        let receipt = client
            .submit_contacts(&outcome.valid)
            .await
            .context("submitting validated contacts")?;
        tracing::info!(
            batch_id = %batch_id,
            accepted = receipt.accepted,
            rejected = receipt.rejected.len(),
            "batch submitted"
        );
        server_rejections = receipt.rejected;
    }

    if args.json {
        print_json_report(batch_id, &outcome, &server_rejections)?;
    } else {
        print_text_report(batch_id, &outcome, &server_rejections);
    }

    Ok(outcome.errors.is_empty() && server_rejections.is_empty())
}

pub(crate) fn run_estimate(contacts: u64, rate: u64, concurrency: u64) {
    let estimate = estimate_queue_window(contacts, rate, concurrency);
    println!(
        "{contacts} contacts at {rate} calls/s (max {concurrency} lines): {}",
        estimate.describe()
    );

    let hours = estimate
        .hours
        .map(|h| format!(", hours: {h}"))
        .unwrap_or_default();
    println!(
        "  seconds: {}, minutes: {}{hours}",
        estimate.seconds, estimate.minutes
    );

    if let Some(advice) = queue_timing_message(contacts) {
        println!("  note: {advice}");
    }
}

fn load_records(path: &Path) -> anyhow::Result<Vec<RawContact>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        other => anyhow::bail!("unsupported batch file extension {other:?} (expected .csv or .json)"),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Vec<RawContact>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing {} as a JSON array of records", path.display()))
}

fn read_csv(path: &Path) -> anyhow::Result<Vec<RawContact>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("reading rows from {}", path.display()))?;
        let mut object = serde_json::Map::new();
        for (field, value) in headers.iter().zip(row.iter()) {
            // Empty spreadsheet cells mean "absent", not "empty string" —
            // this keeps missing-field diagnostics accurate for CSV input.
            if !value.is_empty() {
                object.insert(
                    field.to_string(),
                    serde_json::Value::String(value.to_string()),
                );
            }
        }
        let record: RawContact = serde_json::from_value(serde_json::Value::Object(object))
            .context("converting CSV row to a contact record")?;
        records.push(record);
    }
    Ok(records)
}

fn print_text_report(
    batch_id: Uuid,
    outcome: &BatchOutcome,
    server_rejections: &[RejectedContact],
) {
    let summary = &outcome.summary;
    println!(
        "batch {batch_id}: {} record(s), {} valid, {} invalid",
        summary.total, summary.valid, summary.invalid
    );
    println!(
        "  will import: {}, will skip: {} error(s)",
        summary.will_import, summary.will_skip
    );

    for err in &outcome.errors {
        println!("  [{}] record {}: {}", err.code, err.index, err.message);
    }
    for rejection in server_rejections {
        println!(
            "  [{}] record {} rejected by server: {}",
            rejection.code, rejection.index, rejection.message
        );
    }

    let importing = u64::try_from(summary.will_import).unwrap_or(u64::MAX);
    if let Some(advice) = queue_timing_message(importing) {
        println!("  note: {advice}");
    }
}

fn print_json_report(
    batch_id: Uuid,
    outcome: &BatchOutcome,
    server_rejections: &[RejectedContact],
) -> anyhow::Result<()> {
    let report = serde_json::json!({
        "batchId": batch_id,
        "summary": outcome.summary,
        "validContacts": outcome.valid,
        "errors": outcome.errors,
        "serverRejections": server_rejections,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
