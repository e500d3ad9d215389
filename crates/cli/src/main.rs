//! Demflow CLI - hydrological flow fields from a DEM

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use demflow_algorithms::hydrology::{
    flow_accumulation_ordered, flow_accumulation_trace, flow_direction,
    flow_direction_priority_flood,
};
use demflow_core::io::{read_geotiff, read_text_grid, write_geotiff, write_text_grid};
use demflow_core::{Raster, RasterElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SolverChoice {
    /// Priority-flood traversal from the boundary; routes flow across
    /// flats and pits
    PriorityFlood,
    /// Steepest local drop; interior sinks keep direction 0
    LocalSlope,
}

#[derive(Parser)]
#[command(name = "demflow")]
#[command(author, version, about = "Hydrological flow fields from a DEM", long_about = None)]
struct Cli {
    /// Input elevation raster (.txt/.asc plain-text grid, otherwise GeoTIFF)
    input: PathBuf,

    /// Output path for the flow direction grid (D8 codes 0,1,2,..,128)
    dir_output: PathBuf,

    /// Output path for the flow accumulation grid (upstream cell counts)
    acc_output: PathBuf,

    /// Direction solver
    #[arg(long, value_enum, default_value = "priority-flood")]
    algorithm: SolverChoice,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn is_text_grid(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("txt") | Some("asc")
    )
}

fn read_dem(path: &PathBuf) -> Result<Raster<i32>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<i32> = if is_text_grid(path) {
        read_text_grid(path).context("Failed to read text grid")?
    } else {
        read_geotiff(path).context("Failed to read GeoTIFF")?
    };
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    let (min_x, min_y, max_x, max_y) = raster.bounds();
    debug!(
        "Cell size {}, bounds ({min_x}, {min_y}) to ({max_x}, {max_y})",
        raster.cell_size()
    );
    Ok(raster)
}

fn write_grid<T>(raster: &Raster<T>, path: &PathBuf) -> Result<()>
where
    T: RasterElement + std::fmt::Display,
{
    let pb = spinner("Writing output...");
    if is_text_grid(path) {
        write_text_grid(raster, path).context("Failed to write text grid")?;
    } else {
        write_geotiff(raster, path).context("Failed to write GeoTIFF")?;
    }
    pb.finish_and_clear();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let dem = read_dem(&cli.input)?;
    let stats = dem.statistics();
    if let (Some(min), Some(max)) = (stats.min, stats.max) {
        info!("Elevation range: {} to {}", min, max);
    }

    let pb = spinner("Solving flow field...");
    let start = Instant::now();
    let (direction, accumulation) = match cli.algorithm {
        SolverChoice::PriorityFlood => {
            let routed =
                flow_direction_priority_flood(&dem).context("Failed to solve flow direction")?;
            let acc = flow_accumulation_ordered(&routed.direction, &routed.order)
                .context("Failed to accumulate flow")?;
            (routed.direction, acc)
        }
        SolverChoice::LocalSlope => {
            let dir = flow_direction(&dem).context("Failed to solve flow direction")?;
            let acc = flow_accumulation_trace(&dir).context("Failed to accumulate flow")?;
            (dir, acc)
        }
    };
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    write_grid(&direction, &cli.dir_output)?;
    write_grid(&accumulation, &cli.acc_output)?;

    println!("Flow direction saved to: {}", cli.dir_output.display());
    println!("Flow accumulation saved to: {}", cli.acc_output.display());
    println!("  {} cells in {:.2?}", dem.len(), elapsed);

    Ok(())
}
