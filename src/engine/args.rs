use crate::config::Manifest;

/// File the full manifest is written to inside the output directory
///
/// The engine's command line only carries the fields it has flags for;
/// everything else (timeout, sitemap cap, robots policy, URL patterns) is
/// recorded here as JSON, where pattern lists keep their exact contents.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Builds the engine's argument vector from a manifest
///
/// Only the flags the engine defines are passed, always in the same order.
/// An empty domain is passed as an empty string so the engine derives it
/// from the URL itself.
pub fn engine_args(manifest: &Manifest) -> Vec<String> {
    vec![
        "--url".to_string(),
        manifest.base_url.clone(),
        "--domain".to_string(),
        manifest.allowed_domain.clone(),
        "--depth".to_string(),
        manifest.max_depth.to_string(),
        "--workers".to_string(),
        manifest.max_workers.to_string(),
        "--rate".to_string(),
        manifest.rate_limit.to_string(),
        "--output".to_string(),
        manifest.output_dir.to_string_lossy().into_owned(),
        format!("--sitemap={}", manifest.use_sitemap),
    ]
}
