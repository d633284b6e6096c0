//! Locating the engine executable and building it when it is missing

use crate::BuildError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// An external command run inside the engine directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `go build -o <binary> main.go`
    pub fn go_build(binary_name: &str) -> Self {
        Self::new("go", ["build", "-o", binary_name, "main.go"])
    }

    /// `go version`, used to check the toolchain is installed
    pub fn go_version() -> Self {
        Self::new("go", ["version"])
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(cwd).stdin(Stdio::null());
        cmd
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Where the engine's standard streams go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineStdio {
    /// Pass the engine's output straight through to ours
    #[default]
    Inherit,
    /// Discard the engine's output
    Null,
}

impl EngineStdio {
    pub(crate) fn stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
        }
    }
}

/// How the orchestrator finds, builds, and runs the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Directory holding the engine sources and executable
    pub engine_dir: PathBuf,

    /// Executable name, relative to `engine_dir`
    pub binary_name: String,

    /// Command producing the executable; `None` disables on-demand builds
    pub build: Option<BuildCommand>,

    /// Command that must succeed before building
    pub toolchain_probe: Option<BuildCommand>,

    pub stdio: EngineStdio,
}

impl EngineSettings {
    /// Settings for the Go engine living in `engine_dir`
    pub fn new(engine_dir: impl Into<PathBuf>) -> Self {
        let binary_name = "crawler".to_string();
        Self {
            engine_dir: engine_dir.into(),
            build: Some(BuildCommand::go_build(&binary_name)),
            toolchain_probe: Some(BuildCommand::go_version()),
            binary_name,
            stdio: EngineStdio::Inherit,
        }
    }

    /// Full path of the engine executable
    pub fn binary_path(&self) -> PathBuf {
        self.engine_dir.join(&self.binary_name)
    }

    /// True when the engine executable is present and no build is needed
    pub fn engine_present(&self) -> bool {
        self.binary_path().is_file()
    }
}

/// Checks that the toolchain probe runs and exits successfully
async fn toolchain_available(probe: &BuildCommand, cwd: &Path) -> bool {
    let status = probe
        .command(cwd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    matches!(status, Ok(s) if s.success())
}

/// Builds the engine executable
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the freshly built executable
/// * `Err(BuildError)` - The toolchain is missing, the build failed, or it
///   produced no executable
pub async fn build_engine(settings: &EngineSettings) -> Result<PathBuf, BuildError> {
    let binary = settings.binary_path();

    let build = settings
        .build
        .as_ref()
        .ok_or_else(|| BuildError::ArtifactMissing(binary.display().to_string()))?;

    if !settings.engine_dir.is_dir() {
        return Err(BuildError::MissingEngineDir(
            settings.engine_dir.display().to_string(),
        ));
    }

    if let Some(probe) = &settings.toolchain_probe {
        if !toolchain_available(probe, &settings.engine_dir).await {
            return Err(BuildError::ToolchainMissing(probe.program.clone()));
        }
    }

    tracing::info!("Compiling crawl engine (this may take a moment)...");
    tracing::debug!("Build command: {}", build.describe());

    let output = build
        .command(&settings.engine_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(BuildError::Start)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(BuildError::Failed {
            code: output.status.code(),
            stderr,
        });
    }

    if !binary.is_file() {
        return Err(BuildError::ArtifactMissing(binary.display().to_string()));
    }

    tracing::info!("Crawl engine compiled successfully");
    Ok(binary)
}
