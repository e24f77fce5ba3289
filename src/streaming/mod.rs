pub mod codec;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use codec::{identity_from_index_line, DecodedRecord, RecordReader, RecordWriter};

/// Suffix for per-shard partition files, prefixed by the shard's start index.
pub const PARTITION_SUFFIX: &str = "-partition.txt";

/// Path of the partition file for the shard starting at `start`.
pub fn partition_path(dir: &Path, start: usize) -> PathBuf {
    dir.join(format!("{}{}", start, PARTITION_SUFFIX))
}

/// List all partition files under `dir`, sorted by path for deterministic
/// corpus-wide ordering.
pub fn discover_partitions(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read partition directory: {}", dir.display()))?;

    let mut partitions = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
        let path = entry.path();
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(PARTITION_SUFFIX))
        {
            partitions.push(path);
        }
    }
    partitions.sort();
    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_partition_path_embeds_shard_start() {
        let path = partition_path(Path::new("/out"), 702);
        assert_eq!(path, PathBuf::from("/out/702-partition.txt"));
    }

    #[test]
    fn test_discover_partitions_is_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["351-partition.txt", "0-partition.txt", "notes.txt", "0-stats.json"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let partitions = discover_partitions(dir.path()).unwrap();
        let names: Vec<_> = partitions
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["0-partition.txt", "351-partition.txt"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(discover_partitions(Path::new("/no/such/dir")).is_err());
    }
}
