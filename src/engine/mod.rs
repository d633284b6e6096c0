//! Engine module: the process boundary to the external crawl engine
//!
//! The engine is a separate executable that does the actual fetching. This
//! module only:
//! - Makes sure the executable exists, building it on demand
//! - Encodes a manifest as the engine's argument vector
//! - Launches the engine and bounds it in wall-clock time
//! - Classifies how the run ended

mod args;
mod build;
mod outcome;
mod process;

pub use args::{engine_args, MANIFEST_FILE};
pub use build::{build_engine, BuildCommand, EngineSettings, EngineStdio};
pub use outcome::{CrawlOutcome, Failure, FailureKind, RunPhase};
pub use process::Orchestrator;
