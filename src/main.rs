use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use healthmark_service::analysis;
use healthmark_service::config::AppConfig;
use healthmark_service::logging::{self, Stage};
use healthmark_service::model::{HealthmarkError, Period};
use healthmark_service::{factors, storage, verify};

#[derive(Parser, Debug)]
#[command(name = "healthmark")]
#[command(about = "Health-exposure scoring for location histories", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "HEALTHMARK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch weather and air quality for each location and attach it
    Enrich {
        /// JSON array of {date_str, lat, lon} records
        input: PathBuf,
        /// Where to write the enriched records
        output: PathBuf,
        /// Override ingest.max_requests
        #[arg(long)]
        max_requests: Option<usize>,
    },
    /// Attach health metrics to every enriched record
    Score {
        input: PathBuf,
        output: PathBuf,
    },
    /// Roll scored records up by day, ISO week or month
    Summarize {
        input: PathBuf,
        /// daily, weekly or monthly
        #[arg(short, long, default_value = "weekly")]
        period: Period,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report which environmental fields enriched records actually carry
    Coverage {
        input: PathBuf,
        /// Write the full report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Describe the scored factors, their units and guidelines
    Factors {
        /// Factor key such as pm25 or humidity_dew (defaults to all)
        key: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load_with_env(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("healthmark: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let logger = config
        .logging
        .log_level()
        .and_then(|level| logging::init_logger(level, config.logging.file.as_deref(), config.logging.timestamps));
    if let Err(e) = logger {
        eprintln!("healthmark: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::error(Stage::System, None, &e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &AppConfig) -> Result<(), HealthmarkError> {
    match command {
        Commands::Enrich {
            input,
            output,
            max_requests,
        } => {
            let mut ingest = config.ingest.clone();
            if let Some(max) = max_requests {
                ingest.max_requests = max;
            }
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(ingest.timeout_secs))
                .build()?;
            let mut records = storage::load_records(&input)?;
            storage::enrich_locations(&client, &mut records, &ingest);
            storage::save_records(&output, &records)
        }
        Commands::Score { input, output } => {
            let records = storage::load_records(&input)?;
            let scored = storage::score_records(records, &config.scoring);
            storage::save_records(&output, &scored)
        }
        Commands::Summarize {
            input,
            period,
            output,
        } => {
            let records = storage::load_records(&input)?;
            let bound = storage::scored_records(&records);
            let summaries = analysis::aggregate(&bound, period);
            logging::info(
                Stage::Aggregation,
                None,
                &format!(
                    "{} records -> {} {} summaries",
                    bound.len(),
                    summaries.len(),
                    period
                ),
            );
            emit(output.as_deref(), &summaries)
        }
        Commands::Coverage { input, output } => {
            let records = storage::load_records(&input)?;
            let samples: Vec<_> = records
                .into_iter()
                .filter_map(|r| r.environmental_data)
                .collect();
            let report = verify::coverage_report(&samples);
            verify::print_summary(&report);
            match output {
                Some(path) => storage::write_json(&path, &report),
                None => Ok(()),
            }
        }
        Commands::Factors { key } => {
            for info in factors::select(key.as_deref())? {
                println!("{}\n", factors::describe(info));
            }
            Ok(())
        }
    }
}

fn emit<T: serde::Serialize>(output: Option<&Path>, value: &T) -> Result<(), HealthmarkError> {
    match output {
        Some(path) => storage::write_json(path, value),
        None => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}
