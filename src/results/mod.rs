//! Result artifact handling
//!
//! The engine leaves a `results.json` document in the run's output directory.
//! This module is the single place that decides whether that document can be
//! trusted: it reads it, parses it into typed results, and stamps the
//! orchestrator's own timing onto it.

mod reader;
mod types;

pub use reader::{attach_duration, read_result, results_path, RESULTS_FILE};
pub use types::{CrawlResult, CrawlStats, PageResult};
