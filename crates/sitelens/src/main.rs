mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::logging::LogFormat;
use sitelens::{BuildConfig, Labeling, ProbeConfig, COLUMNS};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "sitelens",
    version,
    about = "Extract website trust features and build labeled datasets"
)]
struct Cli {
    /// Suppress progress and summary output.
    #[arg(long, global = true)]
    quiet: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Append log records to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Per-call network timeout in seconds.
    #[arg(long, global = true, default_value_t = 5)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the feature record for one URL and print it as JSON.
    Extract {
        url: String,
        /// Attach a secure_label (1 secure, 0 malicious).
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
        label: Option<u8>,
    },
    /// Build or resume a labeled CSV dataset from a URL list.
    Build {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 10)]
        batch_size: usize,
        /// Politeness delay after every attempted entry.
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
        /// Only process the first N entries of the list.
        #[arg(long)]
        limit: Option<usize>,
        /// Leave secure_label empty instead of labeling by list position.
        #[arg(long)]
        unlabeled: bool,
    },
    /// Print the output table's column list.
    Columns,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Cli::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(cli::build_cmd::exit_code(&e));
    }
}

async fn run(args: Cli) -> Result<()> {
    if args.quiet {
        std::env::set_var("SITELENS_QUIET", "1");
    }
    cli::logging::init(args.log_format, args.log_file.as_deref())?;

    let probe = ProbeConfig::default().with_timeout(Duration::from_secs(args.timeout_secs));

    match args.command {
        Command::Extract { url, label } => cli::extract_cmd::run(&url, label, &probe).await,
        Command::Build {
            input,
            output,
            batch_size,
            delay_ms,
            limit,
            unlabeled,
        } => {
            let labeling = if unlabeled {
                Labeling::Unlabeled
            } else {
                Labeling::Positional
            };
            let build = BuildConfig::default()
                .with_batch_size(batch_size)
                .with_delay(Duration::from_millis(delay_ms))
                .with_limit(limit)
                .with_labeling(labeling);
            cli::build_cmd::run(&input, &output, &probe, build).await
        }
        Command::Columns => {
            for column in COLUMNS {
                println!("{column}");
            }
            Ok(())
        }
    }
}
