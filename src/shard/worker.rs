use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::{debug, info, warn};
use serde_json::Value;
use tar::Archive;

use crate::extract::{printable, Extractor, SkipReason};
use crate::common::ShardReport;
use crate::shard::channel::{ProgressSink, ProgressUpdate};
use crate::shard::Shard;
use crate::streaming::{partition_path, RecordWriter};

pub struct WorkerConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Emit a progress report every this many records.
    pub progress_every: u64,
    /// Track top titles and venues, for eyeballing corpus skew.
    pub tally_frequencies: bool,
}

impl WorkerConfig {
    pub fn new(data_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            data_dir,
            output_dir,
            progress_every: 100,
            tally_frequencies: false,
        }
    }
}

/// Sorted listing of every archive in the corpus directory. Every worker must
/// see the identical ordering, so an unreadable directory is fatal.
pub fn list_archives(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read corpus directory: {}", data_dir.display()))?;

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| {
            format!("Failed to read directory entry in {}", data_dir.display())
        })?;
        let path = entry.path();
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".tar.gz"))
        {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

/// Occurrence counter for spot-checking the most repeated titles and venues.
#[derive(Debug, Default)]
struct FrequencyTally {
    titles: HashMap<String, u64>,
    venues: HashMap<String, u64>,
}

impl FrequencyTally {
    fn record(&mut self, title: &str, venue: &str) {
        *self.titles.entry(title.to_lowercase()).or_insert(0) += 1;
        *self.venues.entry(venue.to_lowercase()).or_insert(0) += 1;
    }

    fn log_top(&self, count: usize) {
        let mut top = |label: &str, map: &HashMap<String, u64>| {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            info!("Top {} {}:", count, label);
            for (value, occurrences) in entries.into_iter().take(count) {
                info!("  {} x {}", occurrences, value);
            }
        };
        top("titles", &self.titles);
        top("venues", &self.venues);
    }
}

/// Process one shard of the archive listing into its partition file.
///
/// Archives that cannot be opened or streamed are logged and skipped; the
/// shard itself only fails on setup errors (unwritable partition file).
pub fn run_shard(
    shard: Shard,
    archives: &[PathBuf],
    extractor: &Extractor,
    config: &WorkerConfig,
    sink: &dyn ProgressSink,
) -> Result<ShardReport> {
    let assigned: Vec<&PathBuf> = archives
        .iter()
        .skip(shard.start)
        .take(shard.count)
        .collect();

    let mut report = ShardReport::new(shard.start, assigned.len());
    let mut writer = RecordWriter::create(&partition_path(&config.output_dir, shard.start))?;
    let mut frequencies = config.tally_frequencies.then(FrequencyTally::default);

    for archive_path in assigned {
        match process_archive(
            archive_path,
            extractor,
            config,
            shard,
            &mut writer,
            &mut report,
            frequencies.as_mut(),
            sink,
        ) {
            Ok(()) => report.archives_processed += 1,
            Err(e) => {
                warn!("Skipping archive {}: {:#}", archive_path.display(), e);
                report.archives_skipped += 1;
            }
        }
        report.records_written = writer.records_written();
        sink.send(progress_of(shard, &report));
    }

    writer.flush()?;
    report.records_written = writer.records_written();
    sink.send(progress_of(shard, &report));

    if let Some(frequencies) = &frequencies {
        frequencies.log_top(10);
    }

    Ok(report)
}

fn progress_of(shard: Shard, report: &ShardReport) -> ProgressUpdate {
    ProgressUpdate {
        shard_start: shard.start,
        archives_processed: report.archives_processed + report.archives_skipped,
        archives_total: report.archives_assigned,
        records_processed: report.documents.documents_found as usize,
    }
}

#[allow(clippy::too_many_arguments)]
fn process_archive(
    archive_path: &Path,
    extractor: &Extractor,
    config: &WorkerConfig,
    shard: Shard,
    writer: &mut RecordWriter<std::io::BufWriter<fs::File>>,
    report: &mut ShardReport,
    mut frequencies: Option<&mut FrequencyTally>,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let archive_name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| archive_path.display().to_string());

    for entry_result in archive
        .entries()
        .with_context(|| format!("Failed to read entries from {}", archive_path.display()))?
    {
        let mut entry = entry_result
            .with_context(|| format!("Corrupt entry in {}", archive_path.display()))?;
        let path = entry.path()?.to_path_buf();

        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }

        report.documents.documents_found += 1;
        let locator = format!("{}:{}", archive_name, path.display());

        let mut content = String::new();
        if let Err(e) = entry.read_to_string(&mut content) {
            debug!("Unreadable entry {}: {}", locator, e);
            report
                .documents
                .record_skip(&SkipReason::Unforeseen(e.to_string()));
            continue;
        }

        if content.trim().is_empty() {
            report.documents.record_skip(&SkipReason::EmptyRecord);
            continue;
        }

        let raw: Value = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Malformed JSON in {}: {}", locator, e);
                report
                    .documents
                    .record_skip(&SkipReason::Unforeseen(e.to_string()));
                continue;
            }
        };

        match extractor.extract(&raw, &locator, &mut report.references) {
            Ok(document) => {
                if printable(&document.authors).trim().is_empty()
                    || printable(&document.venue).trim().is_empty()
                {
                    report.documents.missing_printable_data += 1;
                    continue;
                }
                if let Some(frequencies) = frequencies.as_deref_mut() {
                    frequencies.record(&document.title, &document.venue);
                }
                report.documents.record_document(&document.document_type);
                writer.write_document(&document)?;
            }
            Err(reason) => report.documents.record_skip(&reason),
        }

        if config.progress_every > 0 && report.documents.documents_found % config.progress_every == 0 {
            report.records_written = writer.records_written();
            sink.send(progress_of(shard, report));
        }
    }

    Ok(())
}
