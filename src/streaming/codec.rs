use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::extract::{printable, CanonicalDocument, Identity};

const TITLE_TOKEN: &str = "#*";
const AUTHORS_TOKEN: &str = "#@";
const YEAR_TOKEN: &str = "#year";
const VENUE_TOKEN: &str = "#conf";
const CITATION_TOKEN: &str = "#citation";
const INDEX_TOKEN: &str = "#index";
const PATH_TOKEN: &str = "#path";
const REFERENCE_TOKEN: &str = "#%";

/// Parse an identity out of one raw partition line, if it is an identity line.
/// Lets the resolver's indexing pass stream identities without decoding whole
/// records.
pub fn identity_from_index_line(line: &str) -> Option<Identity> {
    line.strip_prefix(INDEX_TOKEN)
        .and_then(|rest| rest.trim().parse().ok())
}

/// One decoded record block. Citation count and source locator are present
/// only in the stage that wrote them.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue: String,
    pub citation_count: Option<u64>,
    pub identity: Identity,
    pub source_locator: Option<String>,
    pub references: Vec<Identity>,
}

/// Field accumulator for the block currently being decoded.
#[derive(Debug, Default)]
struct PendingRecord {
    title: Option<String>,
    authors: Option<Vec<String>>,
    year: Option<i32>,
    venue: Option<String>,
    citation_count: Option<u64>,
    identity: Option<Identity>,
    source_locator: Option<String>,
    references: Vec<Identity>,
    fields_seen: usize,
}

impl PendingRecord {
    fn apply_line(&mut self, line: &str) {
        self.fields_seen += 1;
        if let Some(rest) = line.strip_prefix(TITLE_TOKEN) {
            self.title = Some(rest.trim().to_string()).filter(|t| !t.is_empty());
        } else if let Some(rest) = line.strip_prefix(AUTHORS_TOKEN) {
            let authors: Vec<String> = rest
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            self.authors = Some(authors).filter(|a| !a.is_empty());
        } else if let Some(rest) = line.strip_prefix(YEAR_TOKEN) {
            self.year = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix(CITATION_TOKEN) {
            self.citation_count = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix(VENUE_TOKEN) {
            self.venue = Some(rest.trim().to_string()).filter(|v| !v.is_empty());
        } else if let Some(rest) = line.strip_prefix(INDEX_TOKEN) {
            self.identity = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix(PATH_TOKEN) {
            self.source_locator = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(REFERENCE_TOKEN) {
            if let Ok(id) = rest.trim().parse() {
                self.references.push(id);
            }
        } else {
            // Unrecognized line; tolerated, but it still marks the block as
            // holding content so an unusable block is tallied as invalid.
        }
    }

    fn is_empty(&self) -> bool {
        self.fields_seen == 0
    }

    /// A block is complete only when title, authors, venue, and identity are
    /// all present.
    fn complete(self) -> Option<DecodedRecord> {
        Some(DecodedRecord {
            title: self.title?,
            authors: self.authors?,
            year: self.year,
            venue: self.venue?,
            citation_count: self.citation_count,
            identity: self.identity?,
            source_locator: self.source_locator,
            references: self.references,
        })
    }
}

/// Lazy, restartable decoder over a partition stream.
///
/// Tolerates consecutive blank lines and fields arriving out of canonical
/// order; incomplete blocks are discarded and tallied, never yielded. Reads
/// one line at a time so arbitrarily large files never load into memory.
pub struct RecordReader<R: BufRead> {
    lines: Lines<R>,
    pending: PendingRecord,
    invalid_records: u64,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open partition: {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: PendingRecord::default(),
            invalid_records: 0,
            done: false,
        }
    }

    /// Blocks discarded because a required field was missing. Only meaningful
    /// once iteration has finished.
    pub fn invalid_records(&self) -> u64 {
        self.invalid_records
    }

    fn finish_block(&mut self) -> Option<DecodedRecord> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return None;
        }
        match pending.complete() {
            Some(record) => Some(record),
            None => {
                self.invalid_records += 1;
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next() {
                None => {
                    self.done = true;
                    // A final block may end at EOF without a blank line
                    return self.finish_block().map(Ok);
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e).context("Failed to read partition line"));
                }
                Some(Ok(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        if let Some(record) = self.finish_block() {
                            return Some(Ok(record));
                        }
                        continue;
                    }
                    self.pending.apply_line(line);
                }
            }
        }
    }
}

/// Order-fixed encoder for partition and final-dataset files. Every value is
/// reduced to printable ASCII before writing.
pub struct RecordWriter<W: Write> {
    inner: W,
    records_written: u64,
}

impl RecordWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            records_written: 0,
        }
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Write a document in intermediate form (no citation count).
    pub fn write_document(&mut self, doc: &CanonicalDocument) -> Result<()> {
        self.write_block(
            &doc.title,
            &doc.authors,
            Some(doc.year),
            &doc.venue,
            None,
            &doc.identity,
            Some(&doc.source_locator),
            &doc.references,
        )
    }

    /// Write a record in final form: citation count before the identity line,
    /// references replaced by the resolved subset.
    pub fn write_final(
        &mut self,
        record: &DecodedRecord,
        citation_count: u64,
        references: &[Identity],
    ) -> Result<()> {
        self.write_block(
            &record.title,
            &record.authors.join(","),
            record.year,
            &record.venue,
            Some(citation_count),
            &record.identity,
            record.source_locator.as_deref(),
            references,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn write_block(
        &mut self,
        title: &str,
        authors: &str,
        year: Option<i32>,
        venue: &str,
        citation_count: Option<u64>,
        identity: &Identity,
        source_locator: Option<&str>,
        references: &[Identity],
    ) -> Result<()> {
        writeln!(self.inner, "{}{}", TITLE_TOKEN, printable(title))?;
        writeln!(self.inner, "{}{}", AUTHORS_TOKEN, printable(authors))?;
        if let Some(year) = year {
            writeln!(self.inner, "{}{}", YEAR_TOKEN, year)?;
        }
        writeln!(self.inner, "{}{}", VENUE_TOKEN, printable(venue))?;
        if let Some(count) = citation_count {
            writeln!(self.inner, "{}{}", CITATION_TOKEN, count)?;
        }
        writeln!(self.inner, "{}{}", INDEX_TOKEN, identity)?;
        if let Some(locator) = source_locator {
            writeln!(self.inner, "{}{}", PATH_TOKEN, printable(locator))?;
        }
        for reference in references {
            writeln!(self.inner, "{}{}", REFERENCE_TOKEN, reference)?;
        }
        writeln!(self.inner)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().context("Failed to flush record writer")?;
        Ok(())
    }
}
