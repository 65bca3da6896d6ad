pub mod config;
pub mod error;
pub mod processor;
pub mod queue;
pub mod result_dir;
pub mod runner;
pub mod summary;

pub use config::{ClearPolicy, FailurePolicy, RunConfig, RunOptions, Subsampling};
pub use error::{ConfigError, RunError};
pub use result_dir::{Prompt, RunMode};
pub use runner::SegmentationRunner;
pub use summary::RunSummary;
