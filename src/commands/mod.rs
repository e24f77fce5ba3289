pub mod extract;
pub mod pipeline;
pub mod resolve;
pub mod worker;

pub use extract::run_extract;
pub use pipeline::run_pipeline;
pub use resolve::run_resolve;
pub use worker::run_worker;
