use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;

use crate::common::{create_count_progress_bar, create_spinner, ResolveStats};
use crate::extract::Identity;
use crate::streaming::{identity_from_index_line, RecordReader, RecordWriter};

/// Outcome of classifying one reference identity against the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Target exists and is unambiguous.
    Resolved,
    /// Target identity never appeared in any partition.
    Dangling,
    /// Target exists but is shared by several distinct documents.
    CollisionTarget,
}

/// Corpus-wide identity set with its ambiguous subset.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    known: HashSet<Identity>,
    collisions: HashSet<Identity>,
}

impl IdentityIndex {
    /// Classify one reference identity. Collision wins over mere existence.
    pub fn resolve(&self, identity: &Identity) -> Resolution {
        if self.collisions.contains(identity) {
            Resolution::CollisionTarget
        } else if self.known.contains(identity) {
            Resolution::Resolved
        } else {
            Resolution::Dangling
        }
    }

    pub fn is_collision(&self, identity: &Identity) -> bool {
        self.collisions.contains(identity)
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }
}

/// Pass A: stream every document identity out of every partition, sort, and
/// scan for adjacent duplicates. Only identity lines are parsed, so the pass
/// touches a fraction of each partition's bytes.
pub fn build_identity_index(partitions: &[PathBuf]) -> Result<IdentityIndex> {
    let mut identities: Vec<Identity> = Vec::new();

    let spinner = create_spinner("Indexing identities...");
    for path in partitions {
        spinner.set_message(format!("Indexing identities: {}", path.display()));
        let file = File::open(path)
            .with_context(|| format!("Failed to open partition: {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line
                .with_context(|| format!("Failed to read line from {}", path.display()))?;
            if let Some(identity) = identity_from_index_line(&line) {
                identities.push(identity);
            }
        }
    }
    spinner.finish_and_clear();

    identities.par_sort_unstable();

    let mut index = IdentityIndex::default();
    for pair in identities.windows(2) {
        if pair[0] == pair[1] {
            index.collisions.insert(pair[0]);
        }
    }
    index.known.extend(identities);

    info!(
        "Identity index: {} known, {} colliding",
        index.known_count(),
        index.collision_count()
    );
    Ok(index)
}

/// Pass B plus emission: tally citation counts across all partitions, then
/// re-read them to write the final dataset.
///
/// Counts are only complete once every partition has been scanned, so the
/// final records are written in a separate read rather than buffered.
pub fn resolve_citations(
    partitions: &[PathBuf],
    index: &IdentityIndex,
    output: &Path,
) -> Result<ResolveStats> {
    let mut stats = ResolveStats {
        collision_identities: index.collision_count() as u64,
        ..Default::default()
    };
    let mut citation_counts: HashMap<Identity, u64> = HashMap::new();

    let bar = create_count_progress_bar(partitions.len() as u64 * 2);
    for path in partitions {
        let mut reader = RecordReader::open(path)?;
        for record in reader.by_ref() {
            let record = record?;
            if index.is_collision(&record.identity) {
                stats.papers_skipped_collisions += 1;
                continue;
            }
            for reference in &record.references {
                stats.references_attempted += 1;
                match index.resolve(reference) {
                    Resolution::Resolved => {
                        stats.references_resolved += 1;
                        *citation_counts.entry(*reference).or_insert(0) += 1;
                    }
                    Resolution::Dangling => stats.references_dangling += 1,
                    Resolution::CollisionTarget => stats.references_collision += 1,
                }
            }
        }
        stats.invalid_records += reader.invalid_records();
        bar.inc(1);
    }

    stats.papers_with_citations = citation_counts.len() as u64;
    stats.total_citations = citation_counts.values().sum();

    let mut writer = RecordWriter::create(output)?;
    for path in partitions {
        let mut reader = RecordReader::open(path)?;
        for record in reader.by_ref() {
            let record = record?;
            if index.is_collision(&record.identity) {
                continue;
            }
            let kept: Vec<Identity> = record
                .references
                .iter()
                .filter(|r| index.resolve(r) == Resolution::Resolved)
                .copied()
                .collect();
            let citation_count = citation_counts
                .get(&record.identity)
                .copied()
                .unwrap_or(0);

            stats.papers_processed += 1;
            if !kept.is_empty() {
                stats.papers_with_references += 1;
                stats.total_references_kept += kept.len() as u64;
            }
            writer.write_final(&record, citation_count, &kept)?;
        }
        bar.inc(1);
    }
    writer.flush()?;
    bar.finish_and_clear();

    Ok(stats)
}
