use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod import;
mod watch;

#[derive(Debug, Parser)]
#[command(name = "dialkit")]
#[command(about = "Client data layer tools for the dialkit calling platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Contact import tools.
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Watch the automation collection and print detected changes.
    Watch {
        /// Poll cadence override in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Run a single fetch and exit.
        #[arg(long)]
        once: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ImportCommands {
    /// Validate a batch file of contacts and report what would import.
    Validate {
        /// Path to the batch file (.csv or .json).
        #[arg(long)]
        file: PathBuf,
        /// Require a parseable reference date on every record.
        #[arg(long)]
        require_reference_date: bool,
        /// Wire name of the reference-date field.
        #[arg(long, default_value = "referenceDate")]
        reference_date_field: String,
        /// Emit the machine-readable outcome as JSON.
        #[arg(long)]
        json: bool,
        /// Submit the valid contacts to the backend after validation.
        #[arg(long)]
        push: bool,
    },
    /// Estimate how long a batch takes to dial.
    Estimate {
        #[arg(long)]
        contacts: u64,
        /// Calls placed per second.
        #[arg(long, default_value_t = 8)]
        rate: u64,
        /// Maximum simultaneous calls.
        #[arg(long, default_value_t = 80)]
        concurrency: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Import { command }) => match command {
            ImportCommands::Validate {
                file,
                require_reference_date,
                reference_date_field,
                json,
                push,
            } => {
                let clean = import::run_validate(&import::ValidateArgs {
                    file,
                    require_reference_date,
                    reference_date_field,
                    json,
                    push,
                })
                .await?;
                if !clean {
                    std::process::exit(1);
                }
            }
            ImportCommands::Estimate {
                contacts,
                rate,
                concurrency,
            } => import::run_estimate(contacts, rate, concurrency),
        },
        Some(Commands::Watch { interval_ms, once }) => watch::run_watch(interval_ms, once).await?,
        None => println!("no command given; run `dialkit --help` for usage"),
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
