//! Navigation grid development tools.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nav_core::grid::{Connectivity, GridCell};
use nav_core::math::{Fixed, Vec2Fixed};
use nav_tools::bake::{bake_file, BakeOptions};
use nav_tools::{route, validate, ToolError};

#[derive(Parser)]
#[command(name = "nav-tools")]
#[command(about = "Development tools for navigation grids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake an ASCII map into a .nav grid
    Bake {
        /// ASCII map to read
        input: PathBuf,
        /// Grid file to write
        output: PathBuf,
        /// World units per cell
        #[arg(long, default_value = "1")]
        cell_size: f64,
        /// World position of cell (0, 0) as X,Y
        #[arg(long, value_parser = parse_pair::<f64>, default_value = "0,0")]
        origin: (f64, f64),
        /// Allow diagonal steps
        #[arg(long)]
        diagonal: bool,
    },
    /// Validate a .nav file or every .nav file in a directory
    Validate {
        /// File or directory to check
        #[arg(default_value = "assets/grids")]
        path: PathBuf,
    },
    /// Print the path between two cells
    Path {
        /// Grid file (.nav, or ASCII art otherwise)
        grid: PathBuf,
        /// Start cell as X,Y
        #[arg(value_parser = parse_pair::<u32>)]
        from: (u32, u32),
        /// Goal cell as X,Y
        #[arg(value_parser = parse_pair::<u32>)]
        to: (u32, u32),
    },
}

fn parse_pair<T>(s: &str) -> Result<(T, T), String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad X '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad Y '{y}': {e}"))?;
    Ok((x, y))
}

fn run(command: Commands) -> Result<(), ToolError> {
    match command {
        Commands::Bake {
            input,
            output,
            cell_size,
            origin,
            diagonal,
        } => {
            let options = BakeOptions {
                cell_size: Fixed::saturating_from_num(cell_size),
                origin: Vec2Fixed::from_f64(origin.0, origin.1),
                connectivity: if diagonal {
                    Connectivity::Eight
                } else {
                    Connectivity::Four
                },
            };
            let summary = bake_file(&input, &output, &options)?;
            tracing::info!("Baked {}: {summary}", output.display());
            if summary.is_unusable() {
                tracing::warn!("{} has no walkable cells", output.display());
            }
        }
        Commands::Validate { path } => {
            if path.is_dir() {
                let mut failed = 0usize;
                for (file, result) in validate::validate_directory(&path)? {
                    match result {
                        Ok(summary) => tracing::info!("{}: {summary}", file.display()),
                        Err(e) => {
                            failed += 1;
                            tracing::error!("{}: {e}", file.display());
                        }
                    }
                }
                if failed > 0 {
                    return Err(ToolError::InvalidArgument(format!(
                        "{failed} grid(s) failed validation"
                    )));
                }
            } else {
                let summary = validate::validate_file(&path)?;
                tracing::info!("{}: {summary}", path.display());
            }
            tracing::info!("Validation passed");
        }
        Commands::Path { grid, from, to } => {
            let mut nav_grid = route::load_grid(&grid)?;
            let preview = route::preview(
                &mut nav_grid,
                GridCell::new(from.0, from.1),
                GridCell::new(to.0, to.1),
            )?;
            print!("{}", preview.picture);
            match (&preview.path, preview.cost) {
                (Some(path), Some(cost)) => println!("{} steps, cost {cost}", path.len()),
                _ => println!("unreachable"),
            }
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
