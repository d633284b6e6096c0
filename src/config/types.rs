use crate::config::layers::ConfigLayer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Fully resolved configuration for a single crawl run
///
/// Every field carries a concrete value once the resolver hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Absolute URL the engine starts from
    #[serde(rename = "baseURL")]
    pub base_url: String,

    /// Domain the engine restricts itself to
    pub allowed_domain: String,

    /// Maximum link depth from the base URL
    pub max_depth: u32,

    /// Number of concurrent engine workers
    pub max_workers: u32,

    /// Requests per second across all workers
    pub rate_limit: u32,

    /// Wall-clock bound for the whole engine run
    pub timeout_seconds: u64,

    /// Upper bound on URLs taken from sitemaps
    #[serde(rename = "maxSitemapURLs")]
    pub max_sitemap_urls: u32,

    /// Directory the engine writes `results.json` into
    pub output_dir: PathBuf,

    pub use_sitemap: bool,

    pub respect_robots_txt: bool,

    pub exclude_patterns: Vec<String>,

    pub include_patterns: Vec<String>,
}

impl Manifest {
    /// Returns a SHA-256 digest over every field of the manifest
    ///
    /// Field-for-field identical manifests share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let mut feed = |value: &str| {
            hasher.update(value.as_bytes());
            hasher.update([0u8]);
        };

        feed(&self.base_url);
        feed(&self.allowed_domain);
        feed(&self.max_depth.to_string());
        feed(&self.max_workers.to_string());
        feed(&self.rate_limit.to_string());
        feed(&self.timeout_seconds.to_string());
        feed(&self.max_sitemap_urls.to_string());
        feed(&self.output_dir.to_string_lossy());
        feed(&self.use_sitemap.to_string());
        feed(&self.respect_robots_txt.to_string());
        feed(&self.exclude_patterns.len().to_string());
        for pattern in &self.exclude_patterns {
            feed(pattern);
        }
        feed(&self.include_patterns.len().to_string());
        for pattern in &self.include_patterns {
            feed(pattern);
        }

        hex::encode(hasher.finalize())
    }
}

/// Caller-supplied input to the resolver
///
/// `fields` holds explicit per-field overrides; a `None` field never replaces
/// a lower-precedence value, a `Some` field always does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Base URL to crawl (required)
    pub base_url: Option<String>,

    /// Named profile to layer between defaults and overrides
    pub profile: Option<String>,

    /// Explicit field values
    pub fields: ConfigLayer,
}

impl Overrides {
    /// Creates overrides carrying only a base URL
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            base_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the profile name
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Replaces the explicit field overrides
    pub fn with_fields(mut self, fields: ConfigLayer) -> Self {
        self.fields = fields;
        self
    }
}

/// Named bundle of concurrency, depth, rate, and timeout settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub max_depth: u32,

    pub max_workers: u32,

    pub rate_limit: u32,

    pub timeout_seconds: u64,
}

impl Profile {
    /// Converts the profile into a configuration layer
    ///
    /// Only depth, workers, rate, and timeout are carried over; every other
    /// field falls through to lower layers.
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            max_depth: Some(self.max_depth),
            max_workers: Some(self.max_workers),
            rate_limit: Some(self.rate_limit),
            timeout_seconds: Some(self.timeout_seconds),
            ..Default::default()
        }
    }
}
