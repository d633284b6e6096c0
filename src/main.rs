//! Crawl Conductor main entry point
//!
//! This is the command-line interface for the crawl orchestrator.

use clap::Parser;
use crawl_conductor::config::{list_profiles, save_manifest, ConfigLayer, Overrides, Resolution, Resolver, ResolverSettings};
use crawl_conductor::engine::{CrawlOutcome, EngineSettings, Orchestrator};
use crawl_conductor::report::{format_failure, format_page, format_stats, summary_table, write_markdown_summary};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pages printed after a successful crawl
const SAMPLE_PAGES: usize = 5;

/// Crawl Conductor: launches and supervises a crawl engine run
///
/// Resolves the run configuration from defaults, an optional profile, and
/// command-line overrides, runs the crawl engine with it, and reports the
/// validated results.
#[derive(Parser, Debug)]
#[command(name = "crawl-conductor")]
#[command(version = "1.0.0")]
#[command(about = "Control plane for a web crawl job", long_about = None)]
struct Cli {
    /// The URL to start crawling from
    #[arg(value_name = "URL", required_unless_present = "list_profiles")]
    url: Option<String>,

    /// Restrict crawling to this domain (default: extracted from URL)
    #[arg(short, long)]
    domain: Option<String>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<u32>,

    /// Maximum crawl depth
    #[arg(short = 'D', long)]
    depth: Option<u32>,

    /// Rate limit in requests/second
    #[arg(short, long)]
    rate: Option<u32>,

    /// Use a predefined profile (fast, deep, gentle, or one from the config directory)
    #[arg(short, long)]
    profile: Option<String>,

    /// Output directory (default: ~/Desktop/crawler_results_<domain>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use sitemap.xml for URL discovery
    #[arg(short, long, conflicts_with = "no_sitemap")]
    sitemap: bool,

    /// Do not use sitemap.xml for URL discovery
    #[arg(long)]
    no_sitemap: bool,

    /// Wall-clock limit for the whole crawl, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum number of URLs taken from sitemaps
    #[arg(long)]
    max_sitemap_urls: Option<u32>,

    /// Ignore robots.txt directives
    #[arg(long)]
    ignore_robots: bool,

    /// URL pattern to exclude (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// URL pattern to include (repeatable)
    #[arg(long = "include", value_name = "PATTERN")]
    include: Vec<String>,

    /// Directory holding default.toml and profiles/
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Directory holding the crawl engine
    #[arg(long, value_name = "DIR", default_value = "engine")]
    engine_dir: PathBuf,

    /// List available profiles and exit
    #[arg(long)]
    list_profiles: bool,

    /// Resolve and print the configuration without crawling
    #[arg(long)]
    dry_run: bool,

    /// Write the resolved configuration as JSON to this path
    #[arg(long, value_name = "PATH")]
    save_config: Option<PathBuf>,

    /// Show each sample page's links
    #[arg(long)]
    show_links: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let use_sitemap = if self.sitemap {
            Some(true)
        } else if self.no_sitemap {
            Some(false)
        } else {
            None
        };

        Overrides {
            base_url: self.url.clone(),
            profile: self.profile.clone(),
            fields: ConfigLayer {
                allowed_domain: self.domain.clone(),
                max_depth: self.depth,
                max_workers: self.workers,
                rate_limit: self.rate,
                timeout_seconds: self.timeout,
                max_sitemap_urls: self.max_sitemap_urls,
                output_dir: self.output.clone(),
                use_sitemap,
                respect_robots_txt: self.ignore_robots.then_some(false),
                exclude_patterns: (!self.exclude.is_empty()).then(|| self.exclude.clone()),
                include_patterns: (!self.include.is_empty()).then(|| self.include.clone()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if cli.list_profiles {
        for name in list_profiles(cli.config_dir.as_deref()) {
            println!("{}", name);
        }
        return Ok(());
    }

    let resolver = Resolver::new(ResolverSettings {
        config_dir: cli.config_dir.clone(),
        ..Default::default()
    });

    tracing::info!("Building configuration...");
    let resolution = match resolver.resolve(&cli.overrides()) {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!("Failed to resolve configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &cli.save_config {
        save_manifest(&resolution.manifest, path)?;
        tracing::info!("Configuration written to: {}", path.display());
    }

    if cli.dry_run {
        print_dry_run(&resolution);
        return Ok(());
    }

    log_banner(&resolution);

    let mut orchestrator = Orchestrator::new(EngineSettings::new(cli.engine_dir.clone()));
    let manifest = &resolution.manifest;

    match orchestrator.execute(manifest).await {
        CrawlOutcome::Success(result) => {
            match write_markdown_summary(&result, &manifest.output_dir) {
                Ok(path) => tracing::info!("Summary written to: {}", path.display()),
                Err(e) => tracing::warn!("Failed to write summary: {}", e),
            }

            println!("{}", format_stats(&result.stats));

            if !result.results.is_empty() {
                println!("\nSample pages (first {}):", SAMPLE_PAGES);
                for (idx, page) in result.results.iter().take(SAMPLE_PAGES).enumerate() {
                    println!("\n[{}] {}", idx + 1, format_page(page, cli.show_links));
                }
                println!("\n{}", summary_table(&result.results));
            }

            tracing::info!("Results saved to: {}", manifest.output_dir.display());
            tracing::info!("Crawling completed successfully");
            Ok(())
        }
        CrawlOutcome::Failure(failure) => {
            eprintln!("{}", format_failure(&failure));
            std::process::exit(1);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_conductor=info,warn"),
            1 => EnvFilter::new("crawl_conductor=debug,info"),
            2 => EnvFilter::new("crawl_conductor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn log_banner(resolution: &Resolution) {
    let manifest = &resolution.manifest;
    let rule = "=".repeat(60);

    tracing::info!("{}", rule);
    tracing::info!("WEB CRAWLER STARTING");
    tracing::info!("{}", rule);
    tracing::info!("URL:           {}", manifest.base_url);
    tracing::info!("Domain:        {}", manifest.allowed_domain);
    tracing::info!("Max depth:     {}", manifest.max_depth);
    tracing::info!("Workers:       {}", manifest.max_workers);
    tracing::info!("Rate limit:    {} req/s", manifest.rate_limit);
    tracing::info!("Timeout:       {}s", manifest.timeout_seconds);
    tracing::info!("Use sitemap:   {}", manifest.use_sitemap);
    tracing::info!("Output dir:    {}", manifest.output_dir.display());
    tracing::info!("{}", rule);
}

/// Handles --dry-run: shows the resolved manifest and where each value came from
fn print_dry_run(resolution: &Resolution) {
    let manifest = &resolution.manifest;
    let source = |field: &str| {
        resolution
            .provenance
            .get(field)
            .map(|s| s.to_string())
            .unwrap_or_default()
    };

    println!("=== Crawl Conductor Dry Run ===\n");
    println!("  URL:                {}", manifest.base_url);
    println!(
        "  Domain:             {} ({})",
        manifest.allowed_domain,
        source("allowed_domain")
    );
    println!("  Max depth:          {} ({})", manifest.max_depth, source("max_depth"));
    println!("  Workers:            {} ({})", manifest.max_workers, source("max_workers"));
    println!("  Rate limit:         {} ({})", manifest.rate_limit, source("rate_limit"));
    println!(
        "  Timeout:            {}s ({})",
        manifest.timeout_seconds,
        source("timeout_seconds")
    );
    println!(
        "  Max sitemap URLs:   {} ({})",
        manifest.max_sitemap_urls,
        source("max_sitemap_urls")
    );
    println!("  Use sitemap:        {} ({})", manifest.use_sitemap, source("use_sitemap"));
    println!(
        "  Respect robots.txt: {} ({})",
        manifest.respect_robots_txt,
        source("respect_robots_txt")
    );
    println!("  Exclude patterns:   {:?}", manifest.exclude_patterns);
    println!("  Include patterns:   {:?}", manifest.include_patterns);
    println!(
        "  Output dir:         {} ({})",
        manifest.output_dir.display(),
        source("output_dir")
    );

    if !resolution.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &resolution.warnings {
            println!("  - {}", warning);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Fingerprint: {}", manifest.fingerprint());
}
