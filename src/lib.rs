pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod schema;

pub use config::Config;
pub use error::{PipelineError, Stage};
pub use pipeline::{run, RunSummary};
