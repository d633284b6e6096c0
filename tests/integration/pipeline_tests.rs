use crate::common::*;
use crawl_conductor::config::{ConfigLayer, Overrides, ResolveWarning, Resolver, ResolverSettings};
use crawl_conductor::engine::{CrawlOutcome, FailureKind, Orchestrator};
use crawl_conductor::report::{format_markdown_summary, write_markdown_summary, SUMMARY_FILE};
use tempfile::TempDir;

#[tokio::test]
async fn test_run_rejects_invalid_url_without_launching() {
    let root = TempDir::new().unwrap();
    let resolver = resolver(root.path());
    // No engine and no build command: reaching the orchestrator would fail
    // with EngineUnavailable instead.
    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));

    let outcome = crawl_conductor::run(
        &Overrides::for_url("not a url"),
        &resolver,
        &mut orchestrator,
    )
    .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidInput));
}

#[tokio::test]
async fn test_run_rejects_zero_workers() {
    let root = TempDir::new().unwrap();
    let resolver = resolver(root.path());
    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));

    let overrides = Overrides::for_url("https://example.com/").with_fields(ConfigLayer {
        max_workers: Some(0),
        ..Default::default()
    });
    let outcome = crawl_conductor::run(&overrides, &resolver, &mut orchestrator).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidInput));
}

#[tokio::test]
async fn test_run_with_builtin_profile() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let resolver = resolver(root.path());
    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));

    let overrides = Overrides::for_url("https://example.com/").with_profile("fast");
    let resolution = resolver.resolve(&overrides).unwrap();
    let outcome = crawl_conductor::run(&overrides, &resolver, &mut orchestrator).await;

    assert!(outcome.is_success());
    let args = read_args(&resolution.manifest.output_dir);
    assert!(args.contains("--depth 3 --workers 50 --rate 10"));
    assert_eq!(read_manifest(&resolution.manifest.output_dir).timeout_seconds, 300);
}

#[tokio::test]
async fn test_run_with_unknown_profile_uses_defaults() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let resolver = resolver(root.path());
    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));

    let overrides = Overrides::for_url("https://example.com/").with_profile("no-such-profile");
    let resolution = resolver.resolve(&overrides).unwrap();
    assert!(resolution
        .warnings
        .iter()
        .any(|w| matches!(w, ResolveWarning::ProfileNotFound { .. })));

    let outcome = crawl_conductor::run(&overrides, &resolver, &mut orchestrator).await;
    assert!(outcome.is_success());

    let args = read_args(&resolution.manifest.output_dir);
    assert!(args.contains("--depth 5 --workers 20 --rate 2"));
}

#[tokio::test]
async fn test_run_with_config_files_and_overrides() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());

    let config_dir = root.path().join("config");
    std::fs::create_dir_all(config_dir.join("profiles")).unwrap();
    std::fs::write(
        config_dir.join("default.toml"),
        "max-depth = 7\nmax-workers = 8\nexclude-patterns = [\"/admin\"]\n",
    )
    .unwrap();
    std::fs::write(
        config_dir.join("profiles").join("nightly.toml"),
        concat!(
            "description = \"Overnight crawl\"\n",
            "max-depth = 9\nmax-workers = 4\nrate-limit = 1\ntimeout-seconds = 900\n",
        ),
    )
    .unwrap();

    let resolver = Resolver::new(ResolverSettings {
        config_dir: Some(config_dir),
        output_base: root.path().join("results"),
    });
    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));

    let overrides = Overrides::for_url("https://example.com/")
        .with_profile("nightly")
        .with_fields(ConfigLayer {
            rate_limit: Some(3),
            ..Default::default()
        });
    let resolution = resolver.resolve(&overrides).unwrap();
    let outcome = crawl_conductor::run(&overrides, &resolver, &mut orchestrator).await;

    assert!(outcome.is_success());
    let args = read_args(&resolution.manifest.output_dir);
    // the profile shadows default.toml, overrides shadow the profile
    assert!(args.contains("--depth 9 --workers 4 --rate 3"));
    let recorded = read_manifest(&resolution.manifest.output_dir);
    assert_eq!(recorded.timeout_seconds, 900);
    assert_eq!(recorded.exclude_patterns, vec!["/admin".to_string()]);
}

#[tokio::test]
async fn test_successful_run_writes_markdown_summary() {
    let _guard = ENGINE_LOCK.lock().await;
    let root = TempDir::new().unwrap();
    install_engine(root.path(), &writes_valid_results());
    let manifest = manifest(root.path(), 30);

    let mut orchestrator = Orchestrator::new(engine_settings(root.path()));
    let result = match orchestrator.execute(&manifest).await {
        CrawlOutcome::Success(result) => result,
        CrawlOutcome::Failure(f) => panic!("expected success, got {}", f),
    };

    let path = write_markdown_summary(&result, &manifest.output_dir).unwrap();
    assert_eq!(path, manifest.output_dir.join(SUMMARY_FILE));

    let markdown = std::fs::read_to_string(path).unwrap();
    assert_eq!(markdown, format_markdown_summary(&result));
    assert!(markdown.contains("| Pages Crawled | 2 |"));
    assert!(markdown.contains("**Duration**"));
}

#[test]
fn test_resolution_is_deterministic() {
    let root = TempDir::new().unwrap();
    let resolver = resolver(root.path());
    let overrides = Overrides::for_url("https://docs.example.com/guide").with_profile("deep");

    let first = resolver.resolve(&overrides).unwrap().manifest;
    let second = resolver.resolve(&overrides).unwrap().manifest;

    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first
        .output_dir
        .ends_with("crawler_results_docs_example_com"));
}
