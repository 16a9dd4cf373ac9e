//! qlacref-postcodes CLI
//!
//! Generate partition files from a bulk extract, convert an extract to a
//! single flat table, or search resident partitions by partial postcode.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use qlacref_postcodes::writer::{default_flat_path, discover_extract};
use qlacref_postcodes::{Config, PartitionWriter, PostcodeError, PostcodeStore, Record, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Directory searched for an extract when `generate` is given no input
const DEFAULT_SOURCE_DIR: &str = "source";

/// qlacref-postcodes CLI
#[derive(Parser, Debug)]
#[command(name = "qlacref-postcodes")]
#[command(about = "UK postcode reference data: build and search partition files")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a bulk extract into one partition file per leading character
    Generate {
        /// Extract zip (default: the single .zip in ./source)
        input: Option<PathBuf>,

        /// Output directory (default: the configured data directory)
        output_dir: Option<PathBuf>,
    },

    /// Write a bulk extract as one flat table file
    Convert {
        /// Extract zip
        input: PathBuf,

        /// Output file (default: input with a .msgpack.br extension)
        output: Option<PathBuf>,
    },

    /// Search by partial postcode
    Search {
        /// Partial postcode, e.g. "AB1" or "ab1 2cd"
        partial_postcode: String,

        /// Directory holding the partition files
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,qlacref_postcodes=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Generate { input, output_dir } => generate(input, output_dir),
        Commands::Convert { input, output } => convert(&input, output),
        Commands::Search {
            partial_postcode,
            data_dir,
        } => search(&partial_postcode, data_dir.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(error: &PostcodeError) -> u8 {
    u8::try_from(error.exit_code()).unwrap_or(1)
}

fn generate(input: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::from_env()?;

    let input = match input {
        Some(path) => path,
        None => discover_extract(Path::new(DEFAULT_SOURCE_DIR))?,
    };
    let output_dir = output_dir.unwrap_or_else(|| config.data_dir.clone());

    let writer = PartitionWriter::new(&config);
    let manifest = writer.write_all(&input, &output_dir)?;

    for (key, file) in manifest.iter() {
        println!(
            "Writing {:6} entries for the letter {}. {:5.2} MB",
            file.rows,
            key,
            megabytes(file.bytes)
        );
    }
    println!();
    println!("Total size: {:5.2} MB", megabytes(manifest.total_bytes()));

    Ok(())
}

fn convert(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let config = Config::from_env()?;
    let output = output.unwrap_or_else(|| default_flat_path(input));

    let written = PartitionWriter::new(&config).convert(input, &output)?;

    println!(
        "Written {:5.2} MB to {}",
        megabytes(written.bytes),
        written.path.display()
    );
    Ok(())
}

fn search(partial: &str, data_dir: Option<&Path>) -> Result<()> {
    let store = PostcodeStore::open(data_dir)?;
    let needle = qlacref_postcodes::normalize_postcode(partial);

    let results = store.search(&needle)?;
    if results.is_empty() {
        println!("No postcodes found for {}", needle);
        return Ok(());
    }

    println!(
        "{:<10} {:>8} {:>8}  {}",
        "Postcode", "Easting", "Northing", "Local Authority"
    );
    for record in &results {
        println!("{}", format_row(record));
    }
    println!("Found {} postcodes", results.len());

    Ok(())
}

fn format_row(record: &Record) -> String {
    format!(
        "{:<10} {:>8} {:>8}  {}",
        record.postcode,
        format_coordinate(record.easting),
        format_coordinate(record.northing),
        record.local_authority_code.as_deref().unwrap_or("")
    )
}

/// Zero-padded whole metres, blank when missing or NaN
fn format_coordinate(value: Option<f64>) -> String {
    value
        .filter(|v| !v.is_nan())
        .map(|v| format!("{:06.0}", v))
        .unwrap_or_default()
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
