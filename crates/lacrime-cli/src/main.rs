use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use lacrime_core::schema::CRIME_DESCRIPTION;
use lacrime_core::{PipelineConfig, PipelineContext, ALL_CATEGORIES};
use polars::prelude::*;
use tracing_subscriber::EnvFilter;

/// CLI for the LA crime / homelessness cleaning pipeline.
#[derive(Parser, Debug)]
#[command(author, version, about = "LA crime and homelessness data cleaning", long_about = None)]
struct Cli {
    /// Optional TOML config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    crime_file: Option<PathBuf>,
    #[arg(long)]
    homeless_file: Option<PathBuf>,
    /// Decimal places for coordinate rounding.
    #[arg(long)]
    latlng_decimals: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full cleaning pipeline and print a per-category summary
    Clean,
    /// Print the Los Angeles Total Homeless counts for 2012-2016
    HomelessCounts,
    /// Coordinate co-occurrence weights for one category (or "All")
    Weights {
        #[arg(long, default_value = ALL_CATEGORIES)]
        category: String,
        /// How many coordinates to show, densest first.
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let mut ctx = PipelineContext::new(config);

    match cli.command {
        Command::Clean => handle_clean(&mut ctx),
        Command::HomelessCounts => handle_homeless_counts(&mut ctx),
        Command::Weights { category, top } => handle_weights(&mut ctx, &category, top),
    }
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(path) = &cli.crime_file {
        config.crime_data_path = path.clone();
    }
    if let Some(path) = &cli.homeless_file {
        config.homeless_data_path = path.clone();
    }
    if let Some(decimals) = cli.latlng_decimals {
        config.latlng_decimals = decimals;
    }
    Ok(config)
}

fn handle_clean(ctx: &mut PipelineContext) -> Result<()> {
    let enriched = ctx.clean()?;
    println!("Enriched dataset: {} rows", enriched.height());

    let mut counts: Vec<(String, usize)> = Vec::new();
    let categories = enriched.column(CRIME_DESCRIPTION)?.str()?;
    for value in categories.iter().flatten() {
        match counts.iter_mut().find(|(name, _)| name == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut table = Table::new();
    table.set_header(vec!["Category", "Incidents"]);
    for (name, count) in counts {
        table.add_row(vec![name, count.to_string()]);
    }
    println!("{table}");
    Ok(())
}

fn handle_homeless_counts(ctx: &mut PipelineContext) -> Result<()> {
    ctx.load()?;
    let slice = ctx.homeless_counts()?;

    let mut table = Table::new();
    let names: Vec<String> = slice
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    table.set_header(names);
    for idx in 0..slice.height() {
        if let Some(row) = slice.get(idx) {
            table.add_row(row.iter().map(|value| format!("{value}")));
        }
    }
    println!("{table}");
    Ok(())
}

fn handle_weights(ctx: &mut PipelineContext, category: &str, top: usize) -> Result<()> {
    ctx.clean()?;
    let mut weights = ctx.coordinate_weights(category)?;
    weights.sort_by(|a, b| b.support.cmp(&a.support));

    let mut table = Table::new();
    table.set_header(vec!["Latitude", "Longitude", "Support", "Weight"]);
    for weight in weights.iter().take(top) {
        table.add_row(vec![
            format!("{:.4}", weight.latitude),
            format!("{:.4}", weight.longitude),
            weight.support.to_string(),
            format!("{:.3}", weight.weight),
        ]);
    }
    println!("{table}");
    Ok(())
}
