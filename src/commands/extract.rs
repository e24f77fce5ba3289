use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;

use crate::cli::ExtractArgs;
use crate::common::{format_elapsed, setup_logging, ExtractRunStats};
use crate::extract::{Extractor, Stopwords};
use crate::shard::{run_extraction, CoordinatorConfig};

/// Run the full extraction phase across the whole corpus.
pub fn run_extract(args: ExtractArgs) -> Result<ExtractRunStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting corpus extraction");
    info!("Corpus: {}", args.data_dir);
    info!("Partitions: {}", args.output_dir);

    let stopwords = Stopwords::load(PathBuf::from(&args.stopwords).as_path())?;
    let extractor = Extractor::new(stopwords);

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir))?;

    let mut config = CoordinatorConfig::new(
        PathBuf::from(&args.data_dir),
        PathBuf::from(&args.output_dir),
    );
    config.shard_size = args.shard_size;
    config.workers = args.workers;
    config.estimated_total_records = args.estimated_total_records;
    config.poll_interval = Duration::from_secs(args.poll_interval.max(1));
    config.max_idle_polls = args.max_idle_polls;
    config.progress_every = args.progress_every;

    let reports = run_extraction(extractor, &config)?;
    let stats = ExtractRunStats::from_reports(&reports);

    let total_time = start_time.elapsed();

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(total_time));
    info!("Shards completed: {}", stats.shards);
    info!("Archives processed: {}", stats.archives_processed);
    info!("Archives skipped: {}", stats.archives_skipped);
    info!("Records written: {}", stats.records_written);
    stats.documents.log_summary();
    stats.references.log_summary();
    info!("Partitions directory: {}", args.output_dir);
    info!("========================================================");

    Ok(stats)
}
