//! Run outcomes and the orchestrator's lifecycle phases

use crate::results::CrawlResult;
use std::fmt;
use thiserror::Error;

/// Classes of fatal run failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The caller's input could not be resolved into a manifest
    InvalidInput,
    /// The engine executable is absent and could not be built
    EngineUnavailable,
    /// The engine process could not be started
    SpawnFailed,
    /// The engine ran past its wall-clock bound and was killed
    Timeout,
    /// The engine exited unsuccessfully
    EngineExitNonZero,
    /// The engine exited successfully but its artifact is missing or malformed
    ResultUnreadable,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidInput => "invalid input",
            Self::EngineUnavailable => "engine unavailable",
            Self::SpawnFailed => "spawn failed",
            Self::Timeout => "timeout",
            Self::EngineExitNonZero => "engine exited with failure",
            Self::ResultUnreadable => "result unreadable",
        };
        f.write_str(name)
    }
}

/// A failed run: what went wrong and a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
    /// Engine exit code, for `EngineExitNonZero` (`None` if killed by a signal)
    pub exit_code: Option<i32>,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            exit_code: None,
        }
    }

    pub fn exit(code: Option<i32>) -> Self {
        let detail = match code {
            Some(code) => format!("Crawler process exited with code {}", code),
            None => "Crawler process was terminated by a signal".to_string(),
        };
        Self {
            kind: FailureKind::EngineExitNonZero,
            detail,
            exit_code: code,
        }
    }
}

/// Result of one orchestrated run
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    Success(CrawlResult),
    Failure(Failure),
}

impl CrawlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure class, or `None` on success
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f.kind),
        }
    }

    pub fn into_result(self) -> Result<CrawlResult, Failure> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(failure) => Err(failure),
        }
    }
}

/// Lifecycle phase of the orchestrator
///
/// ```text
/// Idle -> EnsuringEngine -> [Building ->] Launching -> Running
///      -> {TimedOut | Exited | SpawnFailed} -> Terminal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    EnsuringEngine,
    Building,
    Launching,
    Running,
    TimedOut,
    Exited(Option<i32>),
    SpawnFailed,
    Terminal,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::EnsuringEngine => write!(f, "ensuring engine"),
            Self::Building => write!(f, "building"),
            Self::Launching => write!(f, "launching"),
            Self::Running => write!(f, "running"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Exited(Some(code)) => write!(f, "exited ({})", code),
            Self::Exited(None) => write!(f, "exited (signal)"),
            Self::SpawnFailed => write!(f, "spawn failed"),
            Self::Terminal => write!(f, "terminal"),
        }
    }
}
