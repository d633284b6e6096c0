use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Aggregate counters reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlStats {
    #[serde(default)]
    pub pages_found: u64,

    #[serde(default)]
    pub pages_crawled: u64,

    #[serde(default)]
    pub external_links: u64,

    #[serde(default)]
    pub excluded_links: u64,

    #[serde(default)]
    pub errors: u64,

    pub start_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Wall-clock run time in seconds, as measured by the orchestrator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl CrawlStats {
    /// Creates empty stats for a run that started at `start_time`
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            pages_found: 0,
            pages_crawled: 0,
            external_links: 0,
            excluded_links: 0,
            errors: 0,
            start_time,
            end_time: None,
            duration: None,
        }
    }

    /// Crawl throughput, if a non-zero duration is known
    pub fn pages_per_second(&self) -> Option<f64> {
        match self.duration {
            Some(d) if d > 0.0 => Some(self.pages_crawled as f64 / d),
            _ => None,
        }
    }
}

/// Outcome of fetching a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,

    #[serde(default)]
    pub title: String,

    /// HTTP status code (0 when the request never got a response)
    #[serde(default)]
    pub status_code: u16,

    #[serde(default)]
    pub depth: u32,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub crawled_at: DateTime<Utc>,

    #[serde(default)]
    pub content_type: String,
}

impl PageResult {
    /// True when the page was fetched with a 2xx status and no error
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code) && self.error.as_deref().map_or(true, str::is_empty)
    }
}

/// Structured artifact written by the engine to `results.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub stats: CrawlStats,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<PageResult>,
}

impl CrawlResult {
    /// Pages that carry an error or a non-2xx status
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.results.iter().filter(|p| !p.is_success())
    }

    /// Share of pages fetched successfully, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let ok = self.results.iter().filter(|p| p.is_success()).count();
        (ok as f64 / self.results.len() as f64) * 100.0
    }

    /// Number of pages at each depth
    pub fn depth_breakdown(&self) -> BTreeMap<u32, u64> {
        let mut breakdown = BTreeMap::new();
        for page in &self.results {
            *breakdown.entry(page.depth).or_insert(0) += 1;
        }
        breakdown
    }

    /// Total number of links found across all pages
    pub fn total_links(&self) -> usize {
        self.results.iter().map(|p| p.links.len()).sum()
    }
}

// The engine encodes empty lists as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
