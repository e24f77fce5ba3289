pub mod cli;
pub mod commands;
pub mod common;
pub mod extract;
pub mod resolve;
pub mod shard;
pub mod streaming;
