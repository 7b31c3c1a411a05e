//! Accident Insights - Road Accident Data Cleaning & Visualization
//!
//! Loads a road-traffic accident CSV, cleans it, summarizes accident
//! frequency by hour, day, severity, weather and road surface, and exports
//! a geographic heatmap of accident locations.

mod charts;
mod config;
mod data;
mod gui;
mod map;
mod output;
mod stats;

use anyhow::{Context, Result};
use charts::StaticChartRenderer;
use clap::Parser;
use config::AnalysisConfig;
use data::{numeric_columns, text_columns, DataLoader, DataProcessor};
use map::Heatmap;
use output::AnalysisSummary;
use stats::StatsCalculator;
use std::path::PathBuf;

/// Categories shown per breakdown in the log
const PREVIEW_CATEGORIES: usize = 8;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Accident CSV file
    #[arg(default_value = "SampleData.csv")]
    input: PathBuf,

    /// JSON file overriding column names and cleaning rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the heatmap page
    #[arg(long, default_value = "accident_hotspots.html")]
    heatmap: PathBuf,

    /// Save the frequency charts as PNG files in this directory
    #[arg(long)]
    charts_dir: Option<PathBuf>,

    /// Write a JSON summary of the cleaning and breakdowns
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Skip the interactive chart window
    #[arg(long)]
    no_show: bool,

    /// Open the heatmap in the default browser
    #[arg(long)]
    open: bool,

    /// Log per-column detail
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    // Load and clean
    let raw = DataLoader::new(&config)
        .load_csv(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    log::info!(
        "Loaded {} rows: {} numeric and {} text columns",
        raw.height(),
        numeric_columns(&raw).len(),
        text_columns(&raw).len()
    );

    let cleaned = DataProcessor::new(&config)
        .clean(raw)
        .context("Cleaning failed")?;

    // Frequency breakdowns
    let breakdowns = StatsCalculator::compute_all_breakdowns(&cleaned.df, &config);
    output::log_breakdowns(&breakdowns, PREVIEW_CATEGORIES);
    let numeric = StatsCalculator::summarize_numeric(&cleaned.df)?;

    if let Some(dir) = &cli.charts_dir {
        let written =
            StaticChartRenderer::render_all(&breakdowns, dir, config.chart_width, config.chart_height)
                .with_context(|| format!("Failed to render charts into {}", dir.display()))?;
        log::info!("{} charts saved to {}", written.len(), dir.display());
    }

    // Heatmap
    let heatmap = Heatmap::from_table(
        &cleaned.df,
        &config.columns.latitude,
        &config.columns.longitude,
    )
    .context("Failed to build heatmap")?;
    heatmap
        .save(&cli.heatmap, &config.heatmap)
        .with_context(|| format!("Failed to write {}", cli.heatmap.display()))?;

    if cli.open {
        if let Err(e) = open::that(&cli.heatmap) {
            log::warn!("Could not open {}: {}", cli.heatmap.display(), e);
        }
    }

    let heatmap_path = cli.heatmap.display().to_string();

    if let Some(path) = &cli.summary {
        let summary = AnalysisSummary {
            input: cli.input.display().to_string(),
            heatmap: Some(heatmap_path.clone()),
            cleaning: &cleaned.report,
            breakdowns: &breakdowns,
            numeric_columns: &numeric,
        };
        output::write_json(path, &summary)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        log::info!("Summary saved to {}", path.display());
    }

    log::info!("Analysis completed. Heatmap saved as '{}'.", heatmap_path);

    if !cli.no_show {
        // Headless machines have no display; the saved outputs still stand
        if let Err(e) = gui::run_viewer(cleaned.report, breakdowns, Some(heatmap_path)) {
            log::warn!("Could not open chart window: {e}. Use --charts-dir to save PNGs instead.");
        }
    }

    Ok(())
}
