use crate::common::*;
use crawl_conductor::engine::{BuildCommand, CrawlOutcome, FailureKind, Orchestrator, RunPhase};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[tokio::test]
async fn test_successful_run_returns_enriched_result() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let manifest = manifest(root.path(), 30);
    assert!(!manifest.output_dir.exists());

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let outcome = orchestrator.execute(&manifest).await;

    let result = match outcome {
        CrawlOutcome::Success(result) => result,
        CrawlOutcome::Failure(f) => panic!("expected success, got {}", f),
    };
    assert_eq!(result.stats.pages_crawled, 2);
    assert_eq!(result.results.len(), 2);
    assert!(result.results[1].links.is_empty());

    let duration = result.stats.duration.expect("duration attached");
    assert!(duration >= 0.0);
    assert!(result.stats.end_time.is_some());
    assert_eq!(orchestrator.phase(), RunPhase::Terminal);

    // The output directory was created before launch
    assert!(manifest.output_dir.is_dir());
}

#[tokio::test]
async fn test_engine_receives_manifest_arguments() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    assert!(orchestrator.execute(&manifest).await.is_success());

    let args = read_args(&manifest.output_dir);
    assert_eq!(
        args.trim_end(),
        format!(
            "--url https://example.com/ --domain example.com --depth 5 --workers 20 --rate 2 --output {} --sitemap=true",
            manifest.output_dir.display()
        )
    );
}

#[tokio::test]
async fn test_fields_without_flags_are_recorded_in_manifest_file() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());

    let mut manifest = manifest(root.path(), 30);
    manifest.respect_robots_txt = false;
    manifest.max_sitemap_urls = 25;
    manifest.exclude_patterns = vec!["a{1,3}".to_string(), "/admin".to_string()];
    manifest.include_patterns = vec!["/docs,/blog".to_string()];

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    assert!(orchestrator.execute(&manifest).await.is_success());

    // Patterns containing commas survive intact
    assert_eq!(read_manifest(&manifest.output_dir), manifest);
    assert!(!read_args(&manifest.output_dir).contains("a{1"));
}

#[tokio::test]
async fn test_relative_output_dir_is_shared_with_engine() {
    struct RemoveOnDrop(PathBuf);
    impl Drop for RemoveOnDrop {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());

    // Relative to our working directory, which is not the engine directory
    let relative = PathBuf::from(format!("conductor-relative-out-{}", std::process::id()));
    let _cleanup = RemoveOnDrop(std::env::current_dir().unwrap().join(&relative));
    let mut manifest = manifest(root.path(), 30);
    manifest.output_dir = relative.clone();

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let outcome = orchestrator.execute(&manifest).await;

    assert!(outcome.is_success(), "{:?}", outcome.failure_kind());
    assert!(relative.join("results.json").is_file());
    assert!(!root.path().join(&relative).exists());
}

#[tokio::test]
async fn test_nonzero_exit_is_reported_with_code() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &format!("{}exit 3\n", writes_valid_results().replace("exit 0\n", "")));
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    // A results file left behind does not rescue a failed run
    assert_eq!(failure.kind, FailureKind::EngineExitNonZero);
    assert_eq!(failure.exit_code, Some(3));
    assert!(failure.detail.contains("exited with code 3"));
}

#[tokio::test]
async fn test_timeout_kills_engine() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), "echo $$ > \"$out/engine.pid\"\nexec sleep 30\n");
    let manifest = manifest(root.path(), 1);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let started = Instant::now();
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(failure.detail.contains("(1s)"));
    assert!(started.elapsed() < Duration::from_secs(10));

    let pid = std::fs::read_to_string(manifest.output_dir.join("engine.pid")).unwrap();
    assert!(!process_alive(pid.trim()));
}

#[tokio::test]
async fn test_fast_exit_beats_timeout() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let manifest = manifest(root.path(), 3);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let started = Instant::now();
    let outcome = orchestrator.execute(&manifest).await;

    assert!(outcome.is_success());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_malformed_results_are_unreadable() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), "echo '{not json' > \"$out/results.json\"\nexit 0\n");
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::ResultUnreadable);
    assert!(failure.detail.contains("malformed"));
}

#[tokio::test]
async fn test_missing_results_are_unreadable() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), "exit 0\n");
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::ResultUnreadable);
    assert!(failure.detail.contains("not found"));
}

#[tokio::test]
async fn test_non_executable_engine_fails_to_spawn() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    let binary = install_engine(root.path(), "exit 0\n");
    std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o644)).unwrap();
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::SpawnFailed);
}

#[tokio::test]
async fn test_unwritable_output_dir_fails_to_spawn() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let blocker = root.path().join("blocker");
    std::fs::write(&blocker, "a file, not a directory").unwrap();

    let mut manifest = manifest(root.path(), 30);
    manifest.output_dir = blocker.join("out");

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::SpawnFailed);
    assert!(failure.detail.contains("output directory"));
}

#[tokio::test]
async fn test_missing_engine_without_build_is_unavailable() {
    let root = TempDir::new().unwrap();
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::EngineUnavailable);
    // Nothing was launched
    assert!(!manifest.output_dir.exists());
}

#[tokio::test]
async fn test_missing_engine_is_built_on_demand() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join("engine.src"),
        engine_script(&writes_valid_results()),
    )
    .unwrap();

    let mut settings = engine_settings(root.path());
    settings.build = Some(BuildCommand::new(
        "sh",
        ["-c", "cp engine.src crawler && chmod 755 crawler"],
    ));
    settings.toolchain_probe = Some(BuildCommand::new("sh", ["-c", "true"]));
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(settings);
    let outcome = orchestrator.execute(&manifest).await;

    assert!(outcome.is_success());
    assert!(root.path().join("crawler").is_file());
}

#[tokio::test]
async fn test_failed_build_is_unavailable() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();

    let mut settings = engine_settings(root.path());
    settings.build = Some(BuildCommand::new(
        "sh",
        ["-c", "echo 'main.go:1: syntax error' >&2; exit 2"],
    ));
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(settings);
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::EngineUnavailable);
    assert!(failure.detail.contains("syntax error"));
}

#[tokio::test]
async fn test_missing_toolchain_is_unavailable() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();

    let mut settings = engine_settings(root.path());
    settings.build = Some(BuildCommand::new("sh", ["-c", "exit 0"]));
    settings.toolchain_probe = Some(BuildCommand::new("definitely-not-a-toolchain-xyz", ["version"]));
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(settings);
    let failure = orchestrator.execute(&manifest).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::EngineUnavailable);
}

#[tokio::test]
async fn test_orchestrator_is_reusable_across_runs() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    assert!(orchestrator.execute(&manifest).await.is_success());
    assert!(orchestrator.execute(&manifest).await.is_success());
    assert_eq!(orchestrator.phase(), RunPhase::Terminal);
}
