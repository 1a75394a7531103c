//! Pulse CLI binary.
//!
//! Provides command-line interface for the Pulse feature pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use pulse::inputs::load_prices;
use pulse::universe::Universe;
use pulse::{DataLayout, Pipeline, PipelineConfig};
use pulse_data::events::write_events;
use pulse_data::news::load_news_dir;
use pulse_data::{AssetClass, KeywordScorer, score_news};
use pulse_features::SentimentAggregator;
use pulse_output::{ExportFormat, Exporter, write_table};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pulse")]
#[command(about = "Pulse: labeled feature tables for price-direction models", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory holding raw/ and processed/
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// JSON configuration file; absent fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the whole pipeline and write the final table
    Build {
        /// Final table path (default: <data-dir>/processed/features_final.csv)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Sample path (default: <data-dir>/processed/features_sample.csv)
        #[arg(long)]
        sample: Option<PathBuf>,

        /// Summary path (default: <data-dir>/processed/dataset_summary.json)
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Score raw news and write daily market sentiment
    Sentiment,

    /// Compute technical indicators and daily aggregates
    Indicators,

    /// List the asset universe
    Universe,

    /// Print the effective configuration as JSON
    Config,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pipeline = match &cli.config {
        Some(path) => Pipeline::from_config_file(path)?,
        None => Pipeline::new(PipelineConfig::default())?,
    };
    let layout = DataLayout::new(&cli.data_dir);

    match cli.command {
        Commands::Build {
            output,
            sample,
            summary,
        } => {
            let output = output.unwrap_or_else(|| layout.features_final());
            let sample = sample.unwrap_or_else(|| layout.features_sample());
            let summary = summary.unwrap_or_else(|| layout.summary());
            build(&pipeline, &layout, &output, &sample, &summary)?;
        }
        Commands::Sentiment => sentiment(&pipeline, &layout)?,
        Commands::Indicators => indicators(&pipeline, &layout)?,
        Commands::Universe => list_universe(&pipeline),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(pipeline.config())?);
        }
    }

    Ok(())
}

fn progress_bar(assets: usize) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(assets as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Computing indicators...");
    Ok(pb)
}

fn asset_count(prices: &[DataFrame]) -> Result<usize, Box<dyn std::error::Error>> {
    let mut total = 0;
    for frame in prices {
        total += frame.column("asset")?.as_materialized_series().n_unique()?;
    }
    Ok(total)
}

fn build(
    pipeline: &Pipeline,
    layout: &DataLayout,
    output: &Path,
    sample: &Path,
    summary: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "PULSE FEATURE PIPELINE");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Data directory: {}", layout.root().display());

    let inputs = pipeline.load_inputs(layout)?;
    println!(
        "Inputs: {} news events, {} search-interest points\n",
        inputs.events.len(),
        inputs.search.len()
    );

    let pb = progress_bar(asset_count(&inputs.prices)?)?;
    let mut result = pipeline.run_with_progress(inputs, |asset| {
        pb.set_message(asset.to_string());
        pb.inc(1);
    })?;
    pb.finish_with_message(format!("{} rows", result.table.height()));

    for dropped in &result.dropped {
        println!(
            "  Dropped {} ({} observations)",
            dropped.asset, dropped.observations
        );
    }

    result.write_to(output, sample)?;
    result
        .summary
        .export_to_file(summary, ExportFormat::PrettyJson)?;

    println!("\n{}", result.summary);
    println!("\nFinal table: {}", output.display());
    println!("Sample:      {}", sample.display());
    println!("Summary:     {}", summary.display());
    Ok(())
}

fn sentiment(pipeline: &Pipeline, layout: &DataLayout) -> Result<(), Box<dyn std::error::Error>> {
    let policy = pipeline.config().sentiment;
    let news = load_news_dir(&layout.raw_dir())?;
    let detector = pipeline.universe().mention_detector();
    let events = score_news(&news, &KeywordScorer::default(), &policy, Some(&detector));
    write_events(&layout.sentiment_scores(), &events)?;

    let index = SentimentAggregator::new(policy).aggregate(&events);
    let mut daily = index.to_frame()?;
    write_table(&mut daily, &layout.market_sentiment())?;

    println!("Scored {} articles over {} days", events.len(), index.len());
    println!("Events:          {}", layout.sentiment_scores().display());
    println!("Daily sentiment: {}", layout.market_sentiment().display());
    Ok(())
}

fn indicators(pipeline: &Pipeline, layout: &DataLayout) -> Result<(), Box<dyn std::error::Error>> {
    let prices = load_prices(layout)?;
    let pb = progress_bar(asset_count(&prices)?)?;
    let mut technical = pipeline.technical(prices, |asset| {
        pb.set_message(asset.to_string());
        pb.inc(1);
    })?;
    pb.finish_with_message(format!("{} rows", technical.frame.height()));

    let mut aggregates = pipeline.daily_aggregates(&technical)?;
    write_table(&mut technical.frame, &layout.technical_features())?;
    write_table(&mut aggregates, &layout.daily_aggregates())?;

    info!(dropped = technical.dropped.len(), "indicators written");
    println!("Technical features: {}", layout.technical_features().display());
    println!("Daily aggregates:   {}", layout.daily_aggregates().display());
    Ok(())
}

fn list_universe(pipeline: &Pipeline) {
    let universe = pipeline.universe();

    println!("Asset Universe");
    println!("==============\n");
    println!("Total assets: {}\n", universe.size());

    for class in AssetClass::all() {
        println!("{}:", class);
        for symbol in universe.symbols_in_class(class) {
            let keywords = universe
                .get(&symbol)
                .map(|a| a.mention_keywords.join(", "))
                .unwrap_or_default();
            println!("  {:10} {}", symbol, keywords);
        }
    }
}
