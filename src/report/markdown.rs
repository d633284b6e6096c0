//! Markdown summary generation
//!
//! This module renders a validated crawl result as a markdown document that
//! is written next to `results.json`.

use crate::report::text::format_duration;
use crate::results::CrawlResult;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the markdown summary inside the output directory
pub const SUMMARY_FILE: &str = "summary.md";

/// Pages listed in the failed-pages table
const MAX_FAILED_PAGES: usize = 20;

/// Writes a markdown summary into the run's output directory
///
/// # Arguments
///
/// * `result` - The validated crawl result
/// * `output_dir` - The run's output directory
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written summary
/// * `Err(std::io::Error)` - Failed to write the summary
pub fn write_markdown_summary(result: &CrawlResult, output_dir: &Path) -> std::io::Result<PathBuf> {
    let path = output_dir.join(SUMMARY_FILE);
    let markdown = format_markdown_summary(result);

    let mut file = File::create(&path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(path)
}

/// Formats a crawl result as markdown
pub fn format_markdown_summary(result: &CrawlResult) -> String {
    let stats = &result.stats;
    let mut md = String::new();

    md.push_str("# Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", stats.start_time.to_rfc3339()));
    if let Some(finished) = &stats.end_time {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = stats.duration {
        md.push_str(&format!("- **Duration**: {}\n", format_duration(duration)));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages Crawled | {} |\n", stats.pages_crawled));
    md.push_str(&format!("| Pages Found | {} |\n", stats.pages_found));
    md.push_str(&format!("| External Links | {} |\n", stats.external_links));
    md.push_str(&format!("| Excluded Links | {} |\n", stats.excluded_links));
    md.push_str(&format!("| Errors | {} |\n\n", stats.errors));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        result.success_rate()
    ));

    // Depth breakdown
    let depths = result.depth_breakdown();
    if !depths.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    // Failed pages
    let failed: Vec<_> = result.failed_pages().collect();
    if !failed.is_empty() {
        md.push_str(&format!("## Top {} Failed Pages\n\n", MAX_FAILED_PAGES));
        md.push_str("| URL | Status | Error |\n");
        md.push_str("|-----|--------|-------|\n");
        for page in failed.iter().take(MAX_FAILED_PAGES) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                page.url,
                page.status_code,
                page.error.as_deref().unwrap_or("")
            ));
        }
        if failed.len() > MAX_FAILED_PAGES {
            md.push_str(&format!(
                "\n... and {} more\n",
                failed.len() - MAX_FAILED_PAGES
            ));
        }
        md.push('\n');
    }

    md
}
