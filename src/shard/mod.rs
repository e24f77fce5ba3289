pub mod channel;
pub mod coordinator;
pub mod worker;

pub use channel::{ChannelSink, LogSink, ProgressSink, ProgressUpdate, StdoutSink};
pub use coordinator::{run_extraction, CoordinatorConfig};
pub use worker::{list_archives, run_shard, WorkerConfig};

/// A contiguous slice of the sorted archive listing assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard {
    /// Index of the first archive in the sorted listing.
    pub start: usize,
    /// Number of archives in the slice.
    pub count: usize,
}

/// Partition `total` archives into shards of `shard_size`, the last shard
/// taking the remainder.
pub fn plan_shards(total: usize, shard_size: usize) -> Vec<Shard> {
    let mut shards = Vec::new();
    let mut start = 0;
    while start < total {
        let count = shard_size.min(total - start);
        shards.push(Shard { start, count });
        start += count;
    }
    shards
}
