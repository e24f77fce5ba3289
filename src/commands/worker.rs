use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use crate::cli::WorkerArgs;
use crate::common::{format_elapsed, setup_logging, ShardReport};
use crate::extract::{Extractor, Stopwords};
use crate::shard::{
    list_archives, run_shard, LogSink, ProgressSink, Shard, StdoutSink, WorkerConfig,
};

/// Run one shard as a standalone process.
pub fn run_worker(args: WorkerArgs) -> Result<ShardReport> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting shard worker");
    info!("Corpus: {}", args.data_dir);
    info!("Output: {}", args.output_dir);
    info!("Shard: start {} count {}", args.start, args.count);

    // Setup errors are fatal before any work starts
    let stopwords = Stopwords::load(PathBuf::from(&args.stopwords).as_path())?;
    let extractor = Extractor::new(stopwords);

    let output_dir = PathBuf::from(&args.output_dir);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir))?;

    let archives = list_archives(PathBuf::from(&args.data_dir).as_path())?;
    info!("Corpus has {} archives", archives.len());

    let mut config = WorkerConfig::new(PathBuf::from(&args.data_dir), output_dir.clone());
    config.progress_every = args.progress_every;
    config.tally_frequencies = args.tally_frequencies;

    let sink: Box<dyn ProgressSink> = if args.stdout_progress {
        Box::new(StdoutSink {
            estimated_total_records: args.estimated_total_records,
        })
    } else {
        Box::new(LogSink)
    };

    let shard = Shard {
        start: args.start,
        count: args.count,
    };
    let report = run_shard(shard, &archives, &extractor, &config, sink.as_ref())?;

    let stats_path = output_dir.join(format!("{}-stats.json", args.start));
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize shard report")?;
    fs::write(&stats_path, json)
        .with_context(|| format!("Failed to write shard report: {}", stats_path.display()))?;

    let total_time = start_time.elapsed();

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(total_time));
    report.log_summary();
    info!("Shard report: {}", stats_path.display());
    info!("========================================================");

    Ok(report)
}
