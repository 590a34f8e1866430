//! Headless navigation runner.
//!
//! This binary drives a movement controller without a game attached,
//! controlled via JSON on stdin/stdout. Designed for scripted tests, CI and
//! tooling that needs to watch the controller think.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario file
//! cargo run -p nav_headless -- --scenario crates/nav_headless/scenarios/corridor.ron
//!
//! # Serve baked grids from a directory
//! cargo run -p nav_headless -- --grids maps/ --map town --agent 4,4 --config tuning.ron
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nav_core::cache::DirectorySource;
use nav_core::config::NavConfig;
use nav_core::math::Vec2Fixed;
use nav_core::world::WorldSnapshot;
use nav_headless::{HeadlessRunner, Scenario};

#[derive(Parser)]
#[command(name = "nav_headless")]
#[command(about = "Headless navigation runner driven by JSON lines")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Scenario file to load
    #[arg(short, long, conflicts_with_all = ["grids", "config"])]
    scenario: Option<PathBuf>,

    /// Directory of baked .nav grids
    #[arg(short, long, requires = "map")]
    grids: Option<PathBuf>,

    /// Map the agent starts on
    #[arg(short, long)]
    map: Option<String>,

    /// Agent start position as X,Y
    #[arg(short, long, value_parser = parse_position, default_value = "0,0")]
    agent: (f64, f64),

    /// Controller config file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_position(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad X '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad Y '{y}': {e}"))?;
    Ok((x, y))
}

fn build_runner(cli: &Cli) -> Result<HeadlessRunner, String> {
    if let Some(path) = &cli.scenario {
        let scenario = Scenario::load(path).map_err(|e| e.to_string())?;
        return HeadlessRunner::from_scenario(&scenario).map_err(|e| e.to_string());
    }

    let (Some(grids), Some(map)) = (&cli.grids, &cli.map) else {
        return Err("either --scenario or --grids with --map is required".into());
    };
    let config = match &cli.config {
        Some(path) => NavConfig::load(path).map_err(|e| e.to_string())?,
        None => NavConfig::default(),
    };
    let world = WorldSnapshot::new(map.as_str())
        .with_agent(Vec2Fixed::from_f64(cli.agent.0, cli.agent.1));
    tracing::info!(grids = %grids.display(), map = %map, "serving baked grids");
    Ok(HeadlessRunner::new(
        config,
        Box::new(DirectorySource::new(grids)),
        world,
    ))
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let mut runner = match build_runner(&cli) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start runner");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = runner.run(stdin.lock(), stdout.lock()) {
        tracing::error!(error = %e, "I/O error");
        std::process::exit(1);
    }
}
