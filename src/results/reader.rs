use crate::results::types::CrawlResult;
use crate::ResultError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the artifact the engine writes into its output directory
pub const RESULTS_FILE: &str = "results.json";

/// Path of the result artifact for an output directory
pub fn results_path(output_dir: &Path) -> PathBuf {
    output_dir.join(RESULTS_FILE)
}

/// Reads and parses the engine's result artifact
///
/// # Arguments
///
/// * `output_dir` - The run's output directory
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The artifact parsed into the expected shape
/// * `Err(ResultError::Missing)` - There is no `results.json`
/// * `Err(ResultError::Malformed)` - The file is not a valid result document
/// * `Err(ResultError::Io)` - The file exists but could not be read
pub fn read_result(output_dir: &Path) -> Result<CrawlResult, ResultError> {
    let path = results_path(output_dir);
    let display = path.display().to_string();

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ResultError::Missing { path: display });
        }
        Err(e) => {
            return Err(ResultError::Io {
                path: display,
                source: e,
            });
        }
    };

    serde_json::from_str(&content).map_err(|e| ResultError::Malformed {
        path: display,
        source: e,
    })
}

/// Stamps orchestrator-measured timing onto a result
///
/// `duration` is always replaced; `end_time` is only filled when the engine
/// did not report one.
pub fn attach_duration(result: &mut CrawlResult, elapsed: Duration, finished_at: DateTime<Utc>) {
    result.stats.duration = Some(elapsed.as_secs_f64());
    if result.stats.end_time.is_none() {
        result.stats.end_time = Some(finished_at);
    }
}
