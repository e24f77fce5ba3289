pub mod logging;
pub mod progress;
pub mod stats;
pub mod utils;

pub use logging::*;
pub use stats::*;
pub use utils::*;

pub use progress::{create_count_progress_bar, create_spinner};
