use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, RecvTimeoutError};
use log::{info, warn};

use crate::common::create_count_progress_bar;
use crate::extract::Extractor;
use crate::common::ShardReport;
use crate::shard::channel::{ChannelSink, ProgressUpdate};
use crate::shard::worker::{list_archives, run_shard, WorkerConfig};
use crate::shard::{plan_shards, Shard};

pub struct CoordinatorConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Archives per shard.
    pub shard_size: usize,
    /// Worker threads; 0 means one per CPU core.
    pub workers: usize,
    /// Corpus-level record estimate, for the completion percentage only.
    pub estimated_total_records: usize,
    pub poll_interval: Duration,
    /// Consecutive silent polls before the coordinator assumes all workers
    /// have exited.
    pub max_idle_polls: u32,
    pub progress_every: u64,
}

impl CoordinatorConfig {
    pub fn new(data_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            data_dir,
            output_dir,
            shard_size: 351,
            workers: 0,
            estimated_total_records: 10_454_961,
            poll_interval: Duration::from_secs(1),
            max_idle_polls: 10_000,
            progress_every: 100,
        }
    }
}

/// Run the whole extraction phase: shard the corpus, process every shard on a
/// fixed worker pool, and aggregate progress until all workers finish.
///
/// Returns one report per shard, ordered by shard start.
pub fn run_extraction(extractor: Extractor, config: &CoordinatorConfig) -> Result<Vec<ShardReport>> {
    let archives = Arc::new(list_archives(&config.data_dir)?);
    if archives.is_empty() {
        return Err(anyhow!(
            "No archives found in {}",
            config.data_dir.display()
        ));
    }

    let shards = plan_shards(archives.len(), config.shard_size);
    let worker_count = if config.workers == 0 {
        num_cpus::get()
    } else {
        config.workers
    }
    .min(shards.len());

    info!(
        "Extracting {} archives in {} shards of {} on {} workers",
        archives.len(),
        shards.len(),
        config.shard_size,
        worker_count
    );

    let (progress_sink, progress_receiver) = ChannelSink::bounded(worker_count * 64);
    let (task_sender, task_receiver) = unbounded::<Shard>();
    for shard in &shards {
        // Unbounded channel, send cannot fail while the receiver lives
        let _ = task_sender.send(*shard);
    }
    drop(task_sender);

    let extractor = Arc::new(extractor);
    let worker_config = Arc::new(WorkerConfig {
        data_dir: config.data_dir.clone(),
        output_dir: config.output_dir.clone(),
        progress_every: config.progress_every,
        tally_frequencies: false,
    });

    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let tasks = task_receiver.clone();
        let archives = Arc::clone(&archives);
        let extractor = Arc::clone(&extractor);
        let worker_config = Arc::clone(&worker_config);
        let sink = progress_sink.clone();

        handles.push(thread::spawn(move || -> Result<Vec<ShardReport>> {
            let mut reports = Vec::new();
            for shard in tasks {
                let report = run_shard(shard, &archives, &extractor, &worker_config, &sink)?;
                reports.push(report);
            }
            Ok(reports)
        }));
    }
    // Workers hold the only remaining sinks; channel disconnect now means
    // every worker has exited.
    drop(progress_sink);

    monitor_progress(
        progress_receiver,
        &shards,
        config.estimated_total_records,
        config.poll_interval,
        config.max_idle_polls,
    );

    let mut reports = Vec::with_capacity(shards.len());
    for handle in handles {
        let worker_reports = handle
            .join()
            .map_err(|_| anyhow!("Worker thread panicked"))??;
        reports.extend(worker_reports);
    }
    reports.sort_by_key(|r| r.shard_start);
    Ok(reports)
}

/// Poll the progress channel until disconnect or a bounded stretch of
/// silence. Reports that move a shard's counters backwards are stale copies
/// and are discarded.
fn monitor_progress(
    receiver: crossbeam_channel::Receiver<ProgressUpdate>,
    shards: &[Shard],
    estimated_total_records: usize,
    poll_interval: Duration,
    max_idle_polls: u32,
) {
    let bar = create_count_progress_bar(estimated_total_records as u64);
    let mut latest: HashMap<usize, ProgressUpdate> = HashMap::new();
    let mut idle_polls = 0u32;

    loop {
        match receiver.recv_timeout(poll_interval) {
            Ok(update) => {
                idle_polls = 0;
                if let Some(previous) = latest.get(&update.shard_start) {
                    if !update.is_newer_than(previous) {
                        continue;
                    }
                }
                latest.insert(update.shard_start, update);

                let records: usize = latest.values().map(|u| u.records_processed).sum();
                let finished = latest
                    .values()
                    .filter(|u| u.archives_processed >= u.archives_total)
                    .count();
                bar.set_position(records.min(estimated_total_records) as u64);
                bar.set_message(format!("{}/{} shards done", finished, shards.len()));
            }
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                idle_polls += 1;
                if idle_polls >= max_idle_polls {
                    warn!(
                        "No progress reports for {} polls, assuming workers exited",
                        idle_polls
                    );
                    break;
                }
            }
        }
    }

    bar.finish_and_clear();
}
