//! Crawl Conductor: the control plane for a crawl job
//!
//! This crate resolves a run manifest from layered configuration, launches an
//! external crawl engine process with that manifest, bounds it in wall-clock
//! time, and validates the `results.json` artifact the engine leaves behind.

pub mod config;
pub mod engine;
pub mod report;
pub mod results;

use thiserror::Error;

/// Error type for fallible crate-level operations such as saving a manifest
///
/// Engine and result-artifact problems are reported through
/// [`CrawlOutcome::Failure`] instead, carrying `BuildError` and `ResultError`
/// text in their detail.
#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors raised while making the engine executable available
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Engine directory not found: {0}")]
    MissingEngineDir(String),

    #[error("Build toolchain '{0}' is not available")]
    ToolchainMissing(String),

    #[error("Failed to start build: {0}")]
    Start(#[source] std::io::Error),

    #[error("Build failed with exit code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Build reported success but {0} is still missing")]
    ArtifactMissing(String),
}

/// Errors raised while reading the engine's result artifact
#[derive(Debug, Error)]
pub enum ResultError {
    #[error("Results file not found: {path}")]
    Missing { path: String },

    #[error("Results file {path} is malformed: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to read results file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for Crawl Conductor operations
pub type Result<T> = std::result::Result<T, ConductorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for result-artifact operations
pub type ResultReadResult<T> = std::result::Result<T, ResultError>;

// Re-export commonly used types
pub use config::{Manifest, Overrides, Resolution, ResolveWarning, Resolver, ResolverSettings};
pub use engine::{CrawlOutcome, EngineSettings, Failure, FailureKind, Orchestrator};
pub use results::{read_result, CrawlResult, CrawlStats, PageResult};

/// Resolves a manifest and runs one crawl with it
///
/// Resolution errors are reported as `Failure(InvalidInput)` so the caller
/// deals with a single discriminated outcome. Resolver warnings are logged
/// by the resolver and otherwise dropped here.
pub async fn run(
    overrides: &Overrides,
    resolver: &Resolver,
    orchestrator: &mut Orchestrator,
) -> CrawlOutcome {
    match resolver.resolve(overrides) {
        Ok(resolution) => orchestrator.execute(&resolution.manifest).await,
        Err(e) => {
            tracing::error!("Configuration rejected: {}", e);
            CrawlOutcome::Failure(Failure::new(FailureKind::InvalidInput, e.to_string()))
        }
    }
}
