use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "citegraph")]
#[command(about = "Unified CLI for extracting and resolving a citation graph from archived document corpora")]
#[command(version = "1.0.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one shard of the corpus into an intermediate partition file
    Worker(WorkerArgs),

    /// Run the full extraction phase: shard the corpus and process every shard in parallel
    Extract(ExtractArgs),

    /// Resolve references across all partitions and emit the final dataset with citation counts
    Resolve(ResolveArgs),

    /// Run the full pipeline: extract -> resolve
    Pipeline(PipelineArgs),
}

#[derive(Parser, Clone)]
pub struct WorkerArgs {
    /// Directory containing the corpus tar.gz archives
    #[arg(short, long, required = true)]
    pub data_dir: String,

    /// Directory for the partition file and shard statistics
    #[arg(short, long, default_value = "partitions")]
    pub output_dir: String,

    /// Index of the first archive in this shard (sorted corpus order)
    #[arg(short, long, required = true)]
    pub start: usize,

    /// Number of archives in this shard
    #[arg(short, long, default_value = "351")]
    pub count: usize,

    /// Stop-word list (JSON array of words) used for identity hashing
    #[arg(long, default_value = "stopwords.json")]
    pub stopwords: String,

    /// Print progress to stdout instead of the log stream
    #[arg(long, default_value = "false")]
    pub stdout_progress: bool,

    /// Estimated total records across the whole corpus, for progress percentages
    #[arg(long, default_value = "10454961")]
    pub estimated_total_records: usize,

    /// Emit a progress report every N records
    #[arg(long, default_value = "100")]
    pub progress_every: u64,

    /// Log the most frequent titles and venues at shard completion
    #[arg(long, default_value = "false")]
    pub tally_frequencies: bool,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ExtractArgs {
    /// Directory containing the corpus tar.gz archives
    #[arg(short, long, required = true)]
    pub data_dir: String,

    /// Directory for intermediate partition files
    #[arg(short, long, default_value = "partitions")]
    pub output_dir: String,

    /// Stop-word list (JSON array of words) used for identity hashing
    #[arg(long, default_value = "stopwords.json")]
    pub stopwords: String,

    /// Archives per shard
    #[arg(long, default_value = "351")]
    pub shard_size: usize,

    /// Worker threads (0 = one per CPU core)
    #[arg(short, long, default_value = "0")]
    pub workers: usize,

    /// Estimated total records across the whole corpus, for progress percentages
    #[arg(long, default_value = "10454961")]
    pub estimated_total_records: usize,

    /// Progress poll interval in seconds
    #[arg(long, default_value = "1")]
    pub poll_interval: u64,

    /// Consecutive silent polls before assuming all workers exited
    #[arg(long, default_value = "10000")]
    pub max_idle_polls: u32,

    /// Emit a progress report every N records per shard
    #[arg(long, default_value = "100")]
    pub progress_every: u64,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ResolveArgs {
    /// Directory containing the intermediate partition files
    #[arg(short, long, default_value = "partitions")]
    pub partitions: String,

    /// Final dataset file
    #[arg(short, long, default_value = "final_output.txt")]
    pub output: String,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct PipelineArgs {
    /// Directory containing the corpus tar.gz archives
    #[arg(short, long, required = true)]
    pub data_dir: String,

    /// Final dataset file
    #[arg(short, long, default_value = "final_output.txt")]
    pub output: String,

    /// Stop-word list (JSON array of words) used for identity hashing
    #[arg(long, default_value = "stopwords.json")]
    pub stopwords: String,

    /// Archives per shard
    #[arg(long, default_value = "351")]
    pub shard_size: usize,

    /// Worker threads (0 = one per CPU core)
    #[arg(short, long, default_value = "0")]
    pub workers: usize,

    /// Estimated total records across the whole corpus, for progress percentages
    #[arg(long, default_value = "10454961")]
    pub estimated_total_records: usize,

    /// Keep intermediate partition files instead of deleting them
    #[arg(long, default_value = "false")]
    pub keep_intermediates: bool,

    /// Directory for intermediate partition files (default: system temp)
    #[arg(long)]
    pub work_dir: Option<String>,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}
