use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use uuid::Uuid;

use crate::cli::{ExtractArgs, PipelineArgs, ResolveArgs};
use crate::commands::{extract, resolve};
use crate::common::{format_elapsed, setup_logging, ExtractRunStats, ResolveStats};

/// Context for managing pipeline state and the intermediate partition
/// directory.
struct PipelineContext {
    partitions_dir: PathBuf,
    keep_intermediates: bool,
}

impl PipelineContext {
    fn new(args: &PipelineArgs) -> Result<Self> {
        let run_id = &Uuid::new_v4().to_string()[..8];

        let work_dir = args
            .work_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);
        let partitions_dir = work_dir.join(format!("citegraph_partitions_{}", run_id));

        fs::create_dir_all(&partitions_dir).with_context(|| {
            format!(
                "Failed to create partition directory: {}",
                partitions_dir.display()
            )
        })?;

        Ok(Self {
            partitions_dir,
            keep_intermediates: args.keep_intermediates,
        })
    }

    fn cleanup(&self) -> Result<()> {
        if self.keep_intermediates {
            info!("Keeping partition directory: {}", self.partitions_dir.display());
            return Ok(());
        }

        info!("Cleaning up partition directory...");
        fs::remove_dir_all(&self.partitions_dir)
            .with_context(|| format!("Failed to remove: {}", self.partitions_dir.display()))?;
        Ok(())
    }
}

impl Drop for PipelineContext {
    fn drop(&mut self) {
        // Best-effort cleanup on drop (e.g., if the pipeline panics)
        if !self.keep_intermediates {
            let _ = fs::remove_dir_all(&self.partitions_dir);
        }
    }
}

/// Run the full pipeline: extract -> resolve
pub fn run_pipeline(args: PipelineArgs) -> Result<(ExtractRunStats, ResolveStats)> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting citation graph pipeline");
    info!("Corpus: {}", args.data_dir);
    info!("Output: {}", args.output);

    let ctx = PipelineContext::new(&args)?;
    info!("Partition directory: {}", ctx.partitions_dir.display());

    info!("");
    info!("=== STEP 1/2: Extracting canonical records ===");
    info!("");

    let extract_args = ExtractArgs {
        data_dir: args.data_dir.clone(),
        output_dir: ctx.partitions_dir.to_string_lossy().to_string(),
        stopwords: args.stopwords.clone(),
        shard_size: args.shard_size,
        workers: args.workers,
        estimated_total_records: args.estimated_total_records,
        poll_interval: 1,
        max_idle_polls: 10_000,
        progress_every: 100,
        log_level: "OFF".to_string(), // Disable logging for sub-steps (we already set up logging)
    };

    let extract_stats = extract::run_extract(extract_args).context("Extract step failed")?;

    setup_logging(&args.log_level)?;
    info!(
        "Extract complete: {} records across {} shards",
        extract_stats.records_written, extract_stats.shards
    );

    info!("");
    info!("=== STEP 2/2: Resolving citation graph ===");
    info!("");

    let resolve_args = ResolveArgs {
        partitions: ctx.partitions_dir.to_string_lossy().to_string(),
        output: args.output.clone(),
        log_level: "OFF".to_string(),
    };

    let resolve_stats = resolve::run_resolve(resolve_args).context("Resolve step failed")?;

    setup_logging(&args.log_level)?;
    info!("Resolve complete: {} papers emitted", resolve_stats.papers_processed);

    ctx.cleanup()?;

    let total_time = start_time.elapsed();

    info!("");
    info!("==================== PIPELINE COMPLETE ====================");
    info!("Total execution time: {}", format_elapsed(total_time));
    info!("");
    info!("Extract step:");
    info!("  Shards: {}", extract_stats.shards);
    info!("  Archives processed: {}", extract_stats.archives_processed);
    info!("  Archives skipped: {}", extract_stats.archives_skipped);
    info!("  Documents found: {}", extract_stats.documents.documents_found);
    info!("  Records written: {}", extract_stats.records_written);
    info!("");
    info!("Resolve step:");
    info!("  Colliding identities: {}", resolve_stats.collision_identities);
    info!(
        "  Papers dropped (ambiguous identity): {}",
        resolve_stats.papers_skipped_collisions
    );
    info!("  Papers emitted: {}", resolve_stats.papers_processed);
    info!("  References resolved: {}", resolve_stats.references_resolved);
    info!("  References dangling: {}", resolve_stats.references_dangling);
    info!("  Total citations: {}", resolve_stats.total_citations);
    info!("");
    info!("Output: {}", args.output);
    info!("===========================================================");

    Ok((extract_stats, resolve_stats))
}
