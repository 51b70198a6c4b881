//! Output formatting and persistence for batch results.
//!
//! Supports pretty-printing, a JSON dump of the full partition, and CSV
//! append of per-batch summary rows.

use anyhow::Result;
use tracing::{debug, info};

use crate::stats::BatchStats;
use crate::transform::ParseOutput;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Logs batch statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &BatchStats) {
    debug!("{:#?}", stats);
}

/// Logs batch statistics as pretty-printed JSON.
pub fn print_json(stats: &BatchStats) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

/// Writes the full three-way partition to a JSON file.
pub fn write_output(path: &str, output: &ParseOutput) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, output)?;
    Ok(())
}

/// Appends a [`BatchStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &BatchStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}
