use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Result};
use log::info;

use crate::cli::ResolveArgs;
use crate::common::{format_elapsed, setup_logging, ResolveStats};
use crate::resolve::{build_identity_index, resolve_citations};
use crate::streaming::discover_partitions;

/// Resolve references across all partitions and emit the final dataset.
pub fn run_resolve(args: ResolveArgs) -> Result<ResolveStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting citation graph resolution");
    info!("Partitions: {}", args.partitions);
    info!("Output: {}", args.output);

    let partitions = discover_partitions(PathBuf::from(&args.partitions).as_path())?;
    if partitions.is_empty() {
        return Err(anyhow!("No partition files found in {}", args.partitions));
    }
    info!("Found {} partitions", partitions.len());

    info!("Pass A: building identity index...");
    let index = build_identity_index(&partitions)?;

    info!("Pass B: resolving references and tallying citations...");
    let stats = resolve_citations(&partitions, &index, PathBuf::from(&args.output).as_path())?;

    let total_time = start_time.elapsed();

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(total_time));
    stats.log_summary();
    info!("Output: {}", args.output);
    info!("========================================================");

    Ok(stats)
}
