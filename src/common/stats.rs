use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::extract::SkipReason;

/// Per-shard tallies over raw records: what was kept, what was skipped, and
/// why. Returned by each worker and merged by the caller.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    pub documents_found: u64,
    pub documents_processed: u64,
    pub empty_records: u64,
    pub missing_title: u64,
    pub useless_title: u64,
    pub non_chapter: u64,
    pub missing_authors: u64,
    pub missing_venue: u64,
    pub self_referential_venue: u64,
    pub invalid_year: u64,
    pub unexpected_schema: u64,
    pub unforeseen_errors: u64,
    pub missing_printable_data: u64,
    /// Documents kept, keyed by aggregation type.
    pub document_types: BTreeMap<String, u64>,
}

impl DocumentStats {
    pub fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::EmptyRecord => self.empty_records += 1,
            SkipReason::MissingTitle => self.missing_title += 1,
            SkipReason::UselessTitle => self.useless_title += 1,
            SkipReason::NonChapterMarker => self.non_chapter += 1,
            SkipReason::MissingAuthors => self.missing_authors += 1,
            SkipReason::MissingVenue => self.missing_venue += 1,
            SkipReason::SelfReferentialVenue => self.self_referential_venue += 1,
            SkipReason::InvalidOrMissingYear => self.invalid_year += 1,
            SkipReason::UnexpectedSchema => self.unexpected_schema += 1,
            SkipReason::Unforeseen(_) => self.unforeseen_errors += 1,
        }
    }

    pub fn record_document(&mut self, document_type: &str) {
        self.documents_processed += 1;
        *self
            .document_types
            .entry(document_type.to_string())
            .or_insert(0) += 1;
    }

    pub fn total_skipped(&self) -> u64 {
        self.empty_records
            + self.missing_title
            + self.useless_title
            + self.non_chapter
            + self.missing_authors
            + self.missing_venue
            + self.self_referential_venue
            + self.invalid_year
            + self.unexpected_schema
            + self.unforeseen_errors
    }

    pub fn merge(&mut self, other: &DocumentStats) {
        self.documents_found += other.documents_found;
        self.documents_processed += other.documents_processed;
        self.empty_records += other.empty_records;
        self.missing_title += other.missing_title;
        self.useless_title += other.useless_title;
        self.non_chapter += other.non_chapter;
        self.missing_authors += other.missing_authors;
        self.missing_venue += other.missing_venue;
        self.self_referential_venue += other.self_referential_venue;
        self.invalid_year += other.invalid_year;
        self.unexpected_schema += other.unexpected_schema;
        self.unforeseen_errors += other.unforeseen_errors;
        self.missing_printable_data += other.missing_printable_data;
        for (doc_type, count) in &other.document_types {
            *self.document_types.entry(doc_type.clone()).or_insert(0) += count;
        }
    }

    pub fn log_summary(&self) {
        let percent = |count: u64| {
            if self.documents_found == 0 {
                0.0
            } else {
                count as f64 / self.documents_found as f64 * 100.0
            }
        };
        info!("Documents found: {}", self.documents_found);
        info!(
            "Documents processed: {} ({:.2}%)",
            self.documents_processed,
            percent(self.documents_processed)
        );
        info!("Documents skipped: {}", self.total_skipped());
        info!("  Empty records: {}", self.empty_records);
        info!("  Missing title: {}", self.missing_title);
        info!("  Useless title: {}", self.useless_title);
        info!("  Non-chapter markers: {}", self.non_chapter);
        info!("  Missing authors: {}", self.missing_authors);
        info!("  Missing venue: {}", self.missing_venue);
        info!("  Self-referential venue: {}", self.self_referential_venue);
        info!("  Invalid or missing year: {}", self.invalid_year);
        info!("  Unexpected schema: {}", self.unexpected_schema);
        info!("  Unforeseen errors: {}", self.unforeseen_errors);
        info!(
            "Documents with non-printable fields reduced: {}",
            self.missing_printable_data
        );
        for (doc_type, count) in &self.document_types {
            info!("  Type {}: {}", doc_type, count);
        }
    }
}

/// Reference-extraction outcome tallies, diagnostic only.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReferenceStats {
    pub attempted: u64,
    pub succeeded: u64,
    pub plaintext: u64,
    pub unexpected_format: u64,
    pub without_titles: u64,
    pub without_authors: u64,
    pub docs_missing_references: u64,
    pub docs_with_few_references: u64,
}

impl ReferenceStats {
    pub fn merge(&mut self, other: &ReferenceStats) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.plaintext += other.plaintext;
        self.unexpected_format += other.unexpected_format;
        self.without_titles += other.without_titles;
        self.without_authors += other.without_authors;
        self.docs_missing_references += other.docs_missing_references;
        self.docs_with_few_references += other.docs_with_few_references;
    }

    pub fn log_summary(&self) {
        info!("References attempted: {}", self.attempted);
        info!("References extracted: {}", self.succeeded);
        info!("  Plaintext (never parsed): {}", self.plaintext);
        info!("  Unexpected format: {}", self.unexpected_format);
        info!("  Without titles: {}", self.without_titles);
        info!("  Without authors: {}", self.without_authors);
        info!("Documents missing references: {}", self.docs_missing_references);
        info!("Documents with few references: {}", self.docs_with_few_references);
    }
}

/// Closing summary for one shard, serialized next to its partition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardReport {
    pub shard_start: usize,
    pub archives_assigned: usize,
    pub archives_processed: usize,
    pub archives_skipped: usize,
    pub records_written: u64,
    pub documents: DocumentStats,
    pub references: ReferenceStats,
}

impl ShardReport {
    pub fn new(shard_start: usize, archives_assigned: usize) -> Self {
        Self {
            shard_start,
            archives_assigned,
            archives_processed: 0,
            archives_skipped: 0,
            records_written: 0,
            documents: DocumentStats::default(),
            references: ReferenceStats::default(),
        }
    }

    pub fn log_summary(&self) {
        info!(
            "Shard {}: {}/{} archives processed, {} skipped, {} records written",
            self.shard_start,
            self.archives_processed,
            self.archives_assigned,
            self.archives_skipped,
            self.records_written
        );
        self.documents.log_summary();
        self.references.log_summary();
    }
}

/// Run-wide rollup over all shard reports.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ExtractRunStats {
    pub shards: usize,
    pub archives_processed: usize,
    pub archives_skipped: usize,
    pub records_written: u64,
    pub documents: DocumentStats,
    pub references: ReferenceStats,
}

impl ExtractRunStats {
    pub fn from_reports(reports: &[ShardReport]) -> Self {
        let mut stats = ExtractRunStats {
            shards: reports.len(),
            ..Default::default()
        };
        for report in reports {
            stats.archives_processed += report.archives_processed;
            stats.archives_skipped += report.archives_skipped;
            stats.records_written += report.records_written;
            stats.documents.merge(&report.documents);
            stats.references.merge(&report.references);
        }
        stats
    }
}

/// Resolver tallies across identity indexing, resolution, and emission.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResolveStats {
    pub invalid_records: u64,
    pub collision_identities: u64,
    pub papers_skipped_collisions: u64,
    pub papers_processed: u64,
    pub references_attempted: u64,
    pub references_resolved: u64,
    pub references_dangling: u64,
    pub references_collision: u64,
    pub papers_with_references: u64,
    pub total_references_kept: u64,
    pub papers_with_citations: u64,
    pub total_citations: u64,
}

impl ResolveStats {
    pub fn log_summary(&self) {
        info!("Invalid partition records discarded: {}", self.invalid_records);
        info!("Colliding identities: {}", self.collision_identities);
        info!(
            "Papers dropped (ambiguous identity): {}",
            self.papers_skipped_collisions
        );
        info!("Papers emitted: {}", self.papers_processed);
        info!("References attempted: {}", self.references_attempted);
        info!("  Resolved: {}", self.references_resolved);
        info!("  Dangling: {}", self.references_dangling);
        info!("  Collision targets: {}", self.references_collision);
        info!("Papers with references kept: {}", self.papers_with_references);
        info!("Total references kept: {}", self.total_references_kept);
        if self.papers_with_references > 0 {
            info!(
                "Average references per citing paper: {:.2}",
                self.total_references_kept as f64 / self.papers_with_references as f64
            );
        }
        info!("Papers with citations: {}", self.papers_with_citations);
        info!("Total citations: {}", self.total_citations);
        if self.papers_with_citations > 0 {
            info!(
                "Average citations per cited paper: {:.2}",
                self.total_citations as f64 / self.papers_with_citations as f64
            );
        }
    }
}
