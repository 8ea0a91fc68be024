//! CLI entry point for the bikeshare statistics tool.
//!
//! Takes the same three selections as the web form (city, month, day),
//! computes the statistics report and prints it to stdout.

use anyhow::{Context, Result};
use bikeshare_stats::config::{SettingValues, Settings};
use bikeshare_stats::filter::{City, DayOfWeek, FilterSelection, Month, ALL};
use bikeshare_stats::loader::Loader;
use bikeshare_stats::output::{print_pretty, render, render_concurrent, to_json, to_text};
use bikeshare_stats::source::CsvDirectory;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_stats")]
#[command(about = "Descriptive statistics over bikeshare trip logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the statistics report for a city
    Report {
        /// City to analyze (Chicago, New York City, Washington)
        #[arg(short, long)]
        city: String,

        /// Month to filter by (January..June) or "All"
        #[arg(short, long, default_value = ALL)]
        month: String,

        /// Day to filter by (Mon..Sun) or "All"
        #[arg(short, long, default_value = ALL)]
        day: String,

        /// Directory holding the city CSV files [env: BIKESHARE_DATA_DIR]
        #[arg(long)]
        data_dir: Option<String>,

        /// JSON file mapping city names to CSV file names [env: BIKESHARE_CITY_SOURCES]
        #[arg(long)]
        city_sources: Option<String>,

        /// Print the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Compute the statistic groups one after another
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// List the accepted city, month and day values
    Options,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            city,
            month,
            day,
            data_dir,
            city_sources,
            json,
            sequential,
        } => {
            let selection = FilterSelection::parse(&city, &month, &day)?;
            let settings = resolve_settings(data_dir, city_sources)?;
            info!(data_dir = %settings.data_dir.display(), "Using trip data");

            let loader = Loader::new(CsvDirectory::new(settings.data_dir, settings.catalog));
            let records = loader
                .load_selection(&selection)
                .with_context(|| format!("failed to load trips for {}", selection.city))?;

            let bundle = if sequential {
                render(&records)
            } else {
                render_concurrent(Arc::new(records)).await?
            };
            print_pretty(&bundle);

            if json {
                println!("{}", to_json(&bundle)?);
            } else {
                print!("{}", to_text(&bundle));
            }
        }
        Commands::Options => {
            let cities: Vec<_> = City::ALL.iter().map(|c| c.name()).collect();
            let months: Vec<_> = Month::ALL.iter().map(|m| m.name()).collect();
            let days: Vec<_> = DayOfWeek::ALL.iter().map(|d| d.abbreviation()).collect();

            println!("Cities: {}", cities.join(", "));
            println!("Months: {ALL}, {}", months.join(", "));
            println!("Days:   {ALL}, {}", days.join(", "));
        }
    }

    Ok(())
}

/// Command-line values win over the environment; the environment wins over
/// the defaults.
fn resolve_settings(data_dir: Option<String>, city_sources: Option<String>) -> Result<Settings> {
    let cli = SettingValues {
        data_dir,
        city_sources,
    };
    Settings::layered(cli, SettingValues::from_env()).context("invalid configuration")
}
