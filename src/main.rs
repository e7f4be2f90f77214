//! Triangular arbitrage calculation engine entry point.
//!
//! ```text
//! triangle-arb run -r demos/relationships.json -d demos/depth.json --cycles 10
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use triangle_arb::arbitrage::{CalculatedResult, Relationship};
use triangle_arb::config::Config;
use triangle_arb::cycle::CycleDriver;
use triangle_arb::metrics;
use triangle_arb::EngineError;
use triangle_arb::orderbook::DepthCache;

/// Triangular arbitrage calculation engine.
#[derive(Parser, Debug)]
#[command(name = "triangle-arb")]
#[command(about = "Evaluate triangular arbitrage relationships against order-book depth")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run calculation cycles over a recorded depth snapshot.
    Run {
        /// JSON file with the candidate relationships.
        #[arg(short, long, env = "RELATIONSHIPS_FILE")]
        relationships: PathBuf,

        /// JSON file mapping each ticker to its depth snapshot.
        #[arg(short, long, env = "DEPTH_FILE")]
        depth: PathBuf,

        /// Number of cycles to run.
        #[arg(short, long, default_value = "1")]
        cycles: u32,

        /// Print Prometheus metrics after the run.
        #[arg(long)]
        print_metrics: bool,
    },

    /// Check configuration validity.
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("triangle_arb=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    match args.command {
        Command::CheckConfig => cmd_check_config(),
        Command::Run {
            relationships,
            depth,
            cycles,
            print_metrics,
        } => cmd_run(&relationships, &depth, cycles, print_metrics),
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("TRIANGLE ARB - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(e.into());
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(EngineError::InvalidConfig(e).into());
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Investment: {} to {} step {}", config.first_investment(), config.investment_max, config.investment_step);
    println!("  Taker Fee: {}% per leg", config.taker_fee);
    println!("  Execution Strategy: {}", config.strategy());
    println!("  Diagnostics: {}", if config.diagnostics_enabled { "Enabled" } else { "Disabled" });
    println!("  Timing History: {} cycles", config.timing_history_capacity);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run calculation cycles over snapshot files.
fn cmd_run(
    relationships_path: &Path,
    depth_path: &Path,
    cycles: u32,
    print_metrics: bool,
) -> anyhow::Result<()> {
    let prometheus = if print_metrics {
        Some(PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };
    metrics::init_metrics();

    info!("Loading configuration...");
    let config = Config::load_validated().map_err(|e| {
        error!("{}", e);
        e
    })?;

    let relationships: Vec<Arc<Relationship>> = read_json::<Vec<Relationship>>(relationships_path)?
        .into_iter()
        .map(Arc::new)
        .collect();
    let mut depth_cache: DepthCache = read_json(depth_path)?;
    for snapshot in depth_cache.values_mut() {
        snapshot.sort_levels();
    }

    info!(
        relationships = relationships.len(),
        instruments = depth_cache.len(),
        strategy = %config.strategy(),
        "Inputs loaded"
    );

    let mut driver = CycleDriver::new(config);
    let mut best: HashMap<String, CalculatedResult> = HashMap::new();
    let mut successes = 0usize;
    let mut errors = 0usize;

    for _ in 0..cycles {
        let stats = driver.cycle(
            &relationships,
            &depth_cache,
            |err| warn!(ticker = err.ticker(), "{}", err),
            |result| {
                if result.is_profitable() {
                    info!(
                        relationship = %result.id,
                        investment = %result.investment,
                        percent = %result.percent,
                        "Profitable relationship"
                    );
                }
                let keep = best
                    .get(&result.id)
                    .map_or(true, |current| result.percent > current.percent);
                if keep {
                    best.insert(result.id.clone(), result);
                }
            },
        );
        successes += stats.success_count;
        errors += stats.error_count;
    }

    let timings = driver.timings();
    println!("======================================================================");
    println!("TRIANGLE ARB - RUN SUMMARY");
    println!("======================================================================");
    println!("  Cycles: {}", driver.cycle_count());
    println!("  Mean cycle time: {:.3}ms (std dev {:.3}ms)", timings.mean_ms(), timings.std_dev_ms());
    println!("  Successes: {}  Errors: {}", successes, errors);
    println!("----------------------------------------------------------------------");

    let mut ranked: Vec<&CalculatedResult> = best.values().collect();
    ranked.sort_by(|a, b| b.percent.cmp(&a.percent));
    for result in ranked {
        println!(
            "  {:<20} {:>10}% at {} {}{}",
            result.id,
            result.percent.round_dp(4),
            result.investment,
            result.relationship.symbol.a,
            result
                .ab_limit_buy_price
                .map(|p| format!(" (AB limit {})", p))
                .unwrap_or_default(),
        );
    }
    println!("======================================================================");

    if let Some(handle) = prometheus {
        println!("{}", handle.render());
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> triangle_arb::Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
