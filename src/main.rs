//! Match Reader command line.
//!
//! Processes one screenshot plus its detector output and writes the match
//! table (`output.tsv`) and report (`report.json`) to the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use match_reader::catalog::Catalog;
use match_reader::config::load_config;
use match_reader::detections::DetectionFile;
use match_reader::ocr::TesseractEngine;
use match_reader::player::Aggregator;
use match_reader::{paths, report};

const LOG_FILE: &str = "match_reader.log";

#[derive(Parser, Debug)]
#[command(name = "match-reader", about = "Reads an end-of-match screenshot into match data")]
struct Args {
    /// End-of-match screenshot
    #[arg(long)]
    screenshot: PathBuf,

    /// Detector output (placements, boxes, star counts) as JSON
    #[arg(long)]
    detections: PathBuf,

    /// Reference catalog of icon hashes
    #[arg(long)]
    catalog: PathBuf,

    /// Engine configuration; defaults to config.json next to the executable
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory; defaults to reports/ next to the executable
    #[arg(long)]
    out: Option<PathBuf>,

    /// Tesseract executable for experience counters without detector text
    #[arg(long)]
    tesseract: Option<PathBuf>,
}

/// Logs to stderr and appends to the log file. `RUST_LOG` sets the level.
fn init_logging() -> Result<()> {
    let log_path = paths::get_logs_dir().join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

fn run(args: Args, out_dir: &Path) -> Result<()> {
    let config_path = args.config.unwrap_or_else(paths::get_default_config_path);
    let config = load_config(&config_path);

    let catalog = Catalog::from_file(&args.catalog, config.identify.hash_size.pow(2))?;

    let screenshot = image::open(&args.screenshot)
        .with_context(|| format!("Failed to open screenshot: {}", args.screenshot.display()))?
        .to_rgba8();
    info!(
        "Loaded screenshot {} ({}x{})",
        args.screenshot.display(),
        screenshot.width(),
        screenshot.height()
    );

    let detections = DetectionFile::from_file(&args.detections)?;
    let engine = TesseractEngine::locate(args.tesseract.as_deref());
    let (input, reader) = detections.into_parts(Some(engine));

    let aggregator = Aggregator::new(&catalog, &config, &reader);
    let match_report = aggregator.run(&screenshot, input)?;

    let tsv_path = out_dir.join("output.tsv");
    report::write_tsv(&match_report, &tsv_path)?;
    info!("Saved table to {}", tsv_path.display());

    let json_path = out_dir.join("report.json");
    report::export_to_json(&match_report, &json_path)?;
    info!("Saved report to {}", json_path.display());

    println!("{}", report::to_text(&match_report));
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let out_dir = args.out.clone().unwrap_or_else(paths::get_reports_dir);

    paths::ensure_directories(&out_dir).context("Failed to create output directories")?;
    init_logging()?;

    std::panic::set_hook(Box::new(|panic_info| {
        error!("[PANIC] {}", panic_info);
    }));

    run(args, &out_dir).inspect_err(|e| error!("{:#}", e))
}
