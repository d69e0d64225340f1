//! Hullgear CLI — gear selection and path search over a bar feed.
//!
//! Commands:
//! - `run` — one selector pass (greedy or scripted) from a TOML config
//! - `search` — breadth-first gear path search, then replay the winner

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hullgear_runner::config::{ModeConfig, RunConfig};
use hullgear_runner::export::save_artifacts;
use hullgear_runner::feed::load_bars_csv;
use hullgear_runner::result::BacktestResult;
use hullgear_runner::runner::{run_search, run_selection};
use hullgear_runner::search::SearchOutcome;

#[derive(Parser)]
#[command(
    name = "hullgear",
    about = "Hullgear CLI — Hull-MA gear selection engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one selector pass over the configured gear grid.
    Run {
        /// Bar feed CSV (time,open,high,low,close; unix-second timestamps).
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Search gear paths level by level and replay the best one.
    Search {
        /// Bar feed CSV (time,open,high,low,close; unix-second timestamps).
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            output_dir,
        } => run_cmd(data, config, output_dir),
        Commands::Search {
            data,
            config,
            output_dir,
        } => search_cmd(data, config, output_dir),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn run_cmd(data: PathBuf, config: Option<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let config = load_config(config)?;
    let bars = load_bars_csv(&data)
        .with_context(|| format!("failed to load bars from {}", data.display()))?;

    let result = run_selection(&config, &bars)?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn search_cmd(data: PathBuf, config: Option<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let config = load_config(config)?;
    let bars = load_bars_csv(&data)
        .with_context(|| format!("failed to load bars from {}", data.display()))?;

    let (result, outcome) = run_search(&config, &bars)?;
    print_search(&outcome);
    print_summary(&result);

    let run_dir = save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn print_search(outcome: &SearchOutcome) {
    println!();
    println!("=== Path Search ===");
    println!("Levels:         {}", outcome.levels);
    println!("Paths scored:   {}", outcome.scored_paths);
    println!(
        "Best path:      [{}]",
        outcome
            .best
            .path
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Best score:     {:.2}", outcome.best.score);
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Run Result ===");
    println!("Run ID:         {}", result.run_id);
    println!(
        "Mode:           {}",
        match &result.config.mode {
            ModeConfig::Greedy => "greedy".to_string(),
            ModeConfig::Scripted { sequence, .. } =>
                format!("scripted ({} choices)", sequence.len()),
        }
    );
    println!(
        "Bars:           {} ({} lead-in)",
        result.stats.bars, result.config.lead_in
    );
    println!("Periods:        {}", result.stats.periods);
    println!("Gears:          {}", result.config.grid.size());
    println!();
    println!("--- Ledger ---");
    println!("Buys:           {}", result.stats.buys);
    println!("Sells:          {}", result.stats.sells);
    println!("Gross Profit:   {:.2}", result.stats.gross_profit);
    println!("Open Mark:      {:.2}", result.stats.final_position_value);
    println!("Score:          {:.2}", result.score);
}
