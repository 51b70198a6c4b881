//! CLI entry point for the Gnip-to-ArcGIS translator.
//!
//! Provides subcommands for normalizing a batch of activity records into
//! feature-ready JSON and for posting a normalized batch to an ArcGIS
//! feature layer.

mod infra;
mod services;

use crate::infra::arcgis::client::ArcgisClient;
use crate::services::feature_service::FeatureService;
use anyhow::Result;
use clap::{Parser, Subcommand};
use esri_gnip::{
    fetch::{BasicClient, fetch_bytes},
    output::{append_record, print_json, write_output},
    parser::parse_activities,
    stats::BatchStats,
    transform::{ParseOptions, parse_records},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "esri_gnip")]
#[command(about = "Translate Gnip activity records into ArcGIS features", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a batch of activity records from a file or URL
    Parse {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// JSON file to write the partitioned output to
        #[arg(short, long, default_value = "output.json")]
        output: String,

        /// CSV file to append a batch summary row to
        #[arg(short, long, default_value = "batches.csv")]
        stats: String,

        /// Treat (0, 0) coordinates as "no location"
        #[arg(long, default_value_t = false)]
        exclude_null_islands: bool,
    },
    /// Normalize a batch and post it to an ArcGIS feature layer
    Post {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Feature layer URL (e.g. https://.../FeatureServer/0)
        #[arg(short, long)]
        url: String,

        /// Treat (0, 0) coordinates as "no location"
        #[arg(long, default_value_t = false)]
        exclude_null_islands: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/esri_gnip.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("esri_gnip.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            source,
            output,
            stats,
            exclude_null_islands,
        } => {
            let bytes = fetcher(&source).await?;
            let records = parse_activities(&bytes)?;
            let options = ParseOptions {
                exclude_null_islands,
            };
            let parsed = parse_records(&records, &options);

            info!(
                total = records.len(),
                normalized = parsed.normalized.len(),
                unlocated = parsed.unlocated.len(),
                translation_errors = parsed.translation_errors.len(),
                "Batch normalized"
            );

            write_output(&output, &parsed)?;

            let batch_stats = BatchStats::from_output(&parsed).with_source(&source);
            print_json(&batch_stats)?;
            append_record(&stats, &batch_stats)?;
        }
        Commands::Post {
            source,
            url,
            exclude_null_islands,
        } => {
            let bytes = fetcher(&source).await?;
            let records = parse_activities(&bytes)?;
            let options = ParseOptions {
                exclude_null_islands,
            };
            let parsed = parse_records(&records, &options);

            let token = std::env::var("ARCGIS_TOKEN").ok();
            let client = ArcgisClient::connect(&url, token).await?;

            let results = client.add_features(&parsed.normalized).await?;
            let successes = results.iter().filter(|r| r.success).count();
            let failures = results.len() - successes;

            for result in results.iter().filter(|r| !r.success) {
                if let Some(err) = &result.error {
                    error!(code = err.code, description = %err.description, "Feature rejected");
                }
            }

            info!(
                posted = successes,
                failed = failures,
                skipped = parsed.unlocated.len(),
                translation_errors = parsed.translation_errors.len(),
                "Batch posted"
            );
        }
    }

    Ok(())
}

/// Loads a batch payload from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &String) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, url).await?
    } else {
        std::fs::read(url)?
    };
    Ok(bytes)
}
