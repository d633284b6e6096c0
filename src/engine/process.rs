//! Launching and supervising the crawl engine process
//!
//! One call to [`Orchestrator::execute`] drives a single run through:
//! - Making sure the engine executable exists (building it if needed)
//! - Creating the output directory and recording the manifest in it
//! - Spawning the engine with the manifest as arguments
//! - Racing the engine's exit against the wall-clock timeout
//! - Reading and validating `results.json` after a clean exit

use crate::config::{save_manifest, Manifest};
use crate::engine::args::{engine_args, MANIFEST_FILE};
use crate::engine::build::{build_engine, EngineSettings};
use crate::engine::outcome::{CrawlOutcome, Failure, FailureKind, RunPhase};
use crate::results::{attach_duration, read_result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tracing::Instrument;

/// Time allowed for a killed engine to be reaped
const REAP_GRACE: Duration = Duration::from_secs(5);

/// Owns the engine process for the duration of a run
///
/// `execute` takes `&mut self`, so a single orchestrator never has two runs
/// in flight.
#[derive(Debug)]
pub struct Orchestrator {
    settings: EngineSettings,
    phase: RunPhase,
}

impl Orchestrator {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            phase: RunPhase::Idle,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Phase reached by the most recent run
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runs the engine once with the given manifest
    ///
    /// Never returns an error: every failure is reported as
    /// `CrawlOutcome::Failure`. No retries are attempted.
    pub async fn execute(&mut self, manifest: &Manifest) -> CrawlOutcome {
        let fingerprint = manifest.fingerprint();
        let short_fingerprint = &fingerprint[..12];
        let span = tracing::info_span!(
            "crawl_run",
            url = %manifest.base_url,
            fingerprint = %short_fingerprint
        );

        self.phase = RunPhase::Idle;
        let outcome = self.run(manifest).instrument(span).await;
        self.transition(RunPhase::Terminal);
        outcome
    }

    async fn run(&mut self, manifest: &Manifest) -> CrawlOutcome {
        self.transition(RunPhase::EnsuringEngine);
        let binary = match self.ensure_engine().await {
            Ok(path) => path,
            Err(failure) => return CrawlOutcome::Failure(failure),
        };

        self.transition(RunPhase::Launching);

        // The engine runs inside engine_dir, so a relative output directory
        // would name a different place for it than for us.
        let output_dir = match absolutize(&manifest.output_dir) {
            Ok(dir) => dir,
            Err(e) => {
                self.transition(RunPhase::SpawnFailed);
                return CrawlOutcome::Failure(Failure::new(
                    FailureKind::SpawnFailed,
                    format!(
                        "could not resolve output directory {}: {}",
                        manifest.output_dir.display(),
                        e
                    ),
                ));
            }
        };
        let manifest = &Manifest {
            output_dir,
            ..manifest.clone()
        };

        if let Err(e) = tokio::fs::create_dir_all(&manifest.output_dir).await {
            tracing::error!(
                "Failed to create output directory {}: {}",
                manifest.output_dir.display(),
                e
            );
            self.transition(RunPhase::SpawnFailed);
            return CrawlOutcome::Failure(Failure::new(
                FailureKind::SpawnFailed,
                format!(
                    "could not create output directory {}: {}",
                    manifest.output_dir.display(),
                    e
                ),
            ));
        }

        let manifest_path = manifest.output_dir.join(MANIFEST_FILE);
        if let Err(e) = save_manifest(manifest, &manifest_path) {
            tracing::warn!("Failed to write {}: {}", manifest_path.display(), e);
        }

        let args = engine_args(manifest);
        tracing::info!("Starting crawl engine...");
        tracing::debug!("Command: {} {}", binary.display(), args.join(" "));

        let started = Instant::now();
        let mut child = match self.spawn(&binary, &args) {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("Failed to start crawl engine: {}", e);
                self.transition(RunPhase::SpawnFailed);
                return CrawlOutcome::Failure(Failure::new(
                    FailureKind::SpawnFailed,
                    format!("{}: {}", binary.display(), e),
                ));
            }
        };

        self.transition(RunPhase::Running);
        let timeout = Duration::from_secs(manifest.timeout_seconds);

        // Whichever completes first settles the run; the losing future is
        // dropped before the branch body runs.
        let status = tokio::select! {
            status = child.wait() => status,
            _ = tokio::time::sleep(timeout) => {
                self.transition(RunPhase::TimedOut);
                tracing::warn!(
                    "Crawl engine exceeded {}s, killing process...",
                    manifest.timeout_seconds
                );
                terminate(&mut child).await;
                return CrawlOutcome::Failure(Failure::new(
                    FailureKind::Timeout,
                    format!("Crawler timeout exceeded ({}s)", manifest.timeout_seconds),
                ));
            }
        };

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Lost track of crawl engine process: {}", e);
                terminate(&mut child).await;
                self.transition(RunPhase::SpawnFailed);
                return CrawlOutcome::Failure(Failure::new(
                    FailureKind::SpawnFailed,
                    format!("failed to wait for engine: {}", e),
                ));
            }
        };

        self.transition(RunPhase::Exited(status.code()));
        if !status.success() {
            let failure = Failure::exit(status.code());
            tracing::error!("{}", failure.detail);
            return CrawlOutcome::Failure(failure);
        }

        tracing::info!("Crawl engine finished successfully");
        match read_result(&manifest.output_dir) {
            Ok(mut result) => {
                attach_duration(&mut result, started.elapsed(), Utc::now());
                CrawlOutcome::Success(result)
            }
            Err(e) => {
                tracing::error!("Failed to read crawler results: {}", e);
                CrawlOutcome::Failure(Failure::new(FailureKind::ResultUnreadable, e.to_string()))
            }
        }
    }

    /// Returns the engine executable path, building it first if it is missing
    async fn ensure_engine(&mut self) -> Result<PathBuf, Failure> {
        if self.settings.engine_present() {
            tracing::debug!("Crawl engine found at {}", self.settings.binary_path().display());
            return Ok(self.settings.binary_path());
        }

        tracing::info!("Crawl engine not found, building...");
        self.transition(RunPhase::Building);
        build_engine(&self.settings).await.map_err(|e| {
            tracing::error!("Crawl engine unavailable: {}", e);
            Failure::new(FailureKind::EngineUnavailable, e.to_string())
        })
    }

    fn spawn(&self, binary: &Path, args: &[String]) -> std::io::Result<Child> {
        Command::new(absolutize(binary)?)
            .args(args)
            .current_dir(&self.settings.engine_dir)
            .stdin(Stdio::null())
            .stdout(self.settings.stdio.stdio())
            .stderr(self.settings.stdio.stdio())
            .kill_on_drop(true)
            .spawn()
    }

    fn transition(&mut self, next: RunPhase) {
        tracing::debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// Anchors a relative path at our working directory
fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_relative() {
        Ok(std::env::current_dir()?.join(path))
    } else {
        Ok(path.to_path_buf())
    }
}

/// Kills the engine and reaps it
///
/// A process that already exited on its own makes this a no-op.
async fn terminate(child: &mut Child) {
    match child.start_kill() {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {
            tracing::debug!("Crawl engine already exited before kill");
        }
        Err(e) => tracing::warn!("Failed to kill crawl engine: {}", e),
    }

    match tokio::time::timeout(REAP_GRACE, child.wait()).await {
        Ok(Ok(status)) => tracing::debug!("Crawl engine reaped ({})", status),
        Ok(Err(e)) => tracing::warn!("Failed to reap crawl engine: {}", e),
        Err(_) => tracing::warn!("Crawl engine still running {:?} after kill", REAP_GRACE),
    }
}
