use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use event_ocr_extractor::batch::{parse_source, BatchRunner};
use event_ocr_extractor::constants::HISTORY_DATE_FORMAT;
use event_ocr_extractor::recognizer::{SidecarRecognizer, TextRecognizer};
use event_ocr_extractor::storage::FsSnapshotStore;
use event_ocr_extractor::{logging, metrics, Config, Extractor};

#[derive(Parser)]
#[command(name = "event_ocr_extractor")]
#[command(about = "Extracts structured event details from OCR'd event-panel screenshots")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to $EXTRACTOR_CONFIG, then config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every screenshot in the input directory and persist both snapshots
    Run {
        /// Overrides the configured input directory
        #[arg(long)]
        input_dir: Option<PathBuf>,
        /// Run date keying the historical snapshot, as DD-MM-YY (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Print the collected metrics when the run finishes
        #[arg(long)]
        print_metrics: bool,
    },
    /// Classify a single screenshot (or its OCR text file) and print the record as JSON
    Classify {
        file: PathBuf,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(&path),
        None => Config::load_from_env(),
    };
    config.context("failed to load configuration")
}

fn parse_run_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(d) => NaiveDate::parse_from_str(&d, HISTORY_DATE_FORMAT)
            .with_context(|| format!("invalid --date '{d}', expected DD-MM-YY")),
        None => Ok(Local::now().date_naive()),
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Run {
            input_dir,
            date,
            print_metrics,
        } => {
            let run_date = parse_run_date(date)?;
            let metrics_handle = if print_metrics { metrics::init_metrics() } else { None };

            let store = FsSnapshotStore::from_config(&config.batch);
            let runner = BatchRunner::new(config, Box::new(SidecarRecognizer::new()), Box::new(store))?;

            let report = runner.run(input_dir.as_deref(), run_date)?;
            if report.total_inputs == 0 {
                warn!("No event data was processed");
            } else {
                info!(
                    "Successfully processed {} screenshots ({} extracted, {} degraded)",
                    report.total_inputs, report.extracted, report.degraded
                );
                for outcome in report.outcomes.iter().filter(|o| o.is_degraded()) {
                    error!("Degraded: {}", outcome.source_image());
                }
            }

            if let Some(handle) = metrics_handle {
                println!("{}", handle.render());
            }
        }
        Commands::Classify { file } => {
            let source = parse_source(&file)?;
            let text = SidecarRecognizer::new().recognize(&file)?;
            let extractor = Extractor::new(config.extraction)?;
            let record = extractor.extract(&text, &source);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
