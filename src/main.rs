use anyhow::Result;
use clap::Parser;

use citegraph::cli::{Cli, Commands};
use citegraph::commands::{run_extract, run_pipeline, run_resolve, run_worker};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Worker(args) => {
            run_worker(args)?;
        }
        Commands::Extract(args) => {
            run_extract(args)?;
        }
        Commands::Resolve(args) => {
            run_resolve(args)?;
        }
        Commands::Pipeline(args) => {
            run_pipeline(args)?;
        }
    }

    Ok(())
}
