use std::io::Write;

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::info;

/// One progress report from a running shard. Wire form is four
/// whitespace-separated integers so reports stay trivially parseable across
/// process boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Shard start index, doubling as the shard's identifier.
    pub shard_start: usize,
    pub archives_processed: usize,
    pub archives_total: usize,
    pub records_processed: usize,
}

impl ProgressUpdate {
    pub fn to_wire(&self) -> String {
        format!(
            "{} {} {} {}",
            self.shard_start, self.archives_processed, self.archives_total, self.records_processed
        )
    }

    pub fn from_wire(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();
        let mut next = || -> Result<usize> {
            fields
                .next()
                .ok_or_else(|| anyhow!("Progress report has fewer than 4 fields: {:?}", line))?
                .parse()
                .map_err(|e| anyhow!("Malformed progress field in {:?}: {}", line, e))
        };
        Ok(Self {
            shard_start: next()?,
            archives_processed: next()?,
            archives_total: next()?,
            records_processed: next()?,
        })
    }

    /// Counters only ever grow within one shard. A report that moves any
    /// counter backwards is stale or corrupt and must be ignored.
    pub fn is_newer_than(&self, previous: &ProgressUpdate) -> bool {
        self.shard_start == previous.shard_start
            && self.archives_processed >= previous.archives_processed
            && self.records_processed >= previous.records_processed
    }
}

/// Where a worker sends its progress. Sends never block and never fail; a
/// report that cannot be delivered is dropped, since the next one supersedes
/// it anyway.
pub trait ProgressSink: Send {
    fn send(&self, update: ProgressUpdate);
}

/// In-process sink backed by a bounded channel, for coordinator-managed
/// workers.
#[derive(Clone)]
pub struct ChannelSink {
    sender: Sender<ProgressUpdate>,
}

impl ChannelSink {
    pub fn bounded(capacity: usize) -> (Self, Receiver<ProgressUpdate>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelSink {
    fn send(&self, update: ProgressUpdate) {
        // Lossy on a full channel
        let _ = self.sender.try_send(update);
    }
}

/// Sink for standalone worker runs, writing percentage lines to stdout.
pub struct StdoutSink {
    pub estimated_total_records: usize,
}

impl ProgressSink for StdoutSink {
    fn send(&self, update: ProgressUpdate) {
        let percent = if self.estimated_total_records > 0 {
            update.records_processed as f64 / self.estimated_total_records as f64 * 100.0
        } else {
            0.0
        };
        print!(
            "\rshard {}: {}/{} archives, {} records (~{:.2}% of corpus)",
            update.shard_start,
            update.archives_processed,
            update.archives_total,
            update.records_processed,
            percent
        );
        let _ = std::io::stdout().flush();
    }
}

/// Sink that routes wire-format reports into the log stream, so progress can
/// be tailed out of a standalone worker's log.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn send(&self, update: ProgressUpdate) {
        info!("progress {}", update.to_wire());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(shard_start: usize, archives: usize, records: usize) -> ProgressUpdate {
        ProgressUpdate {
            shard_start,
            archives_processed: archives,
            archives_total: 351,
            records_processed: records,
        }
    }

    #[test]
    fn test_wire_round_trip() {
        let original = update(702, 17, 4210);
        let decoded = ProgressUpdate::from_wire(&original.to_wire()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_from_wire_rejects_malformed_reports() {
        assert!(ProgressUpdate::from_wire("1 2 3").is_err());
        assert!(ProgressUpdate::from_wire("1 2 three 4").is_err());
        assert!(ProgressUpdate::from_wire("").is_err());
    }

    #[test]
    fn test_monotonicity_check() {
        let earlier = update(0, 5, 1000);
        let later = update(0, 6, 1200);
        assert!(later.is_newer_than(&earlier));
        assert!(!earlier.is_newer_than(&later));
        // Equal counters are acceptable (idle shard re-reporting)
        assert!(earlier.is_newer_than(&earlier));
        // Reports from a different shard never compare as newer
        assert!(!update(351, 6, 1200).is_newer_than(&earlier));
    }

    #[test]
    fn test_channel_sink_is_lossy_when_full() {
        let (sink, receiver) = ChannelSink::bounded(1);
        sink.send(update(0, 1, 100));
        sink.send(update(0, 2, 200));
        assert_eq!(receiver.try_recv().unwrap(), update(0, 1, 100));
        assert!(receiver.try_recv().is_err());
    }
}
