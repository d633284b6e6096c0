//! Plain-text formatting of crawl results

use crate::engine::Failure;
use crate::results::{CrawlResult, CrawlStats, PageResult};
use std::path::Path;

/// Links shown per page before the list is cut short
pub const MAX_LINKS_SHOWN: usize = 10;

/// Column widths of the summary table: URL, status, depth, links
pub const TABLE_WIDTHS: [usize; 4] = [50, 10, 8, 10];

const RULE_WIDTH: usize = 60;

/// Formats seconds as `12.3s` below a minute and `2m 5s` from a minute on
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let remaining = (seconds % 60.0).floor() as u64;
    format!("{}m {}s", minutes, remaining)
}

/// Abbreviates large counts: `1.5K` from 1,000 and `2.3M` from 1,000,000
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        return format!("{:.1}M", num as f64 / 1_000_000.0);
    }
    if num >= 1_000 {
        return format!("{:.1}K", num as f64 / 1_000.0);
    }
    num.to_string()
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes >= MB {
        return format!("{:.2} MB", bytes as f64 / MB as f64);
    }
    if bytes >= KB {
        return format!("{:.2} KB", bytes as f64 / KB as f64);
    }
    format!("{} B", bytes)
}

pub fn format_speed(pages_per_second: f64) -> String {
    format!("{:.1} pages/sec", pages_per_second)
}

/// Renders `[=====     ] 50%`
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).floor() as usize;
    let empty = width - filled;
    format!(
        "[{}{}] {:.0}%",
        "=".repeat(filled),
        " ".repeat(empty),
        percentage
    )
}

/// Aggregate statistics block
pub fn format_stats(stats: &CrawlStats) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        rule.clone(),
        "CRAWLING STATISTICS".to_string(),
        rule.clone(),
        format!("Pages crawled:      {}", stats.pages_crawled),
        format!("Pages found:        {}", stats.pages_found),
        format!("External links:     {}", stats.external_links),
        format!("Excluded links:     {}", stats.excluded_links),
        format!("Errors:             {}", stats.errors),
    ];

    if let Some(duration) = stats.duration {
        lines.push(format!("Total time:         {}", format_duration(duration)));
        if stats.pages_crawled > 0 {
            if let Some(speed) = stats.pages_per_second() {
                lines.push(format!("Average speed:      {}", format_speed(speed)));
            }
        }
    }

    lines.push(rule);
    lines.join("\n")
}

/// Detail block for one page, optionally with its (truncated) link list
pub fn format_page(page: &PageResult, show_links: bool) -> String {
    let title = if page.title.is_empty() {
        "Untitled"
    } else {
        page.title.as_str()
    };

    let mut lines = vec![
        format!("URL:         {}", page.url),
        format!("Title:       {}", title),
        format!("Status:      {}", page.status_code),
        format!("Depth:       {}", page.depth),
        format!("Content:     {}", page.content_type),
        format!("Links found: {}", page.links.len()),
        format!("Crawled at:  {}", page.crawled_at.to_rfc3339()),
    ];

    if let Some(error) = page.error.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!("Error:       {}", error));
    }

    if show_links && !page.links.is_empty() {
        lines.push("Links:".to_string());
        for link in page.links.iter().take(MAX_LINKS_SHOWN) {
            lines.push(format!("  - {}", link));
        }
        if page.links.len() > MAX_LINKS_SHOWN {
            lines.push(format!(
                "  ... and {} more",
                page.links.len() - MAX_LINKS_SHOWN
            ));
        }
    }

    lines.join("\n")
}

/// One `| a | b |` row, padding or truncating each cell to its width
pub fn format_table_row(columns: &[&str], widths: &[usize]) -> String {
    let cells: Vec<String> = columns
        .iter()
        .zip(widths)
        .map(|(col, &width)| {
            let len = col.chars().count();
            if len > width {
                let keep = width.saturating_sub(3);
                format!("{}...", col.chars().take(keep).collect::<String>())
            } else {
                format!("{}{}", col, " ".repeat(width - len))
            }
        })
        .collect();

    format!("| {} |", cells.join(" | "))
}

/// Fixed-width table of URL, status, depth, and link count per page
pub fn summary_table(pages: &[PageResult]) -> String {
    let separator = format!(
        "+{}+",
        TABLE_WIDTHS
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut lines = vec![
        separator.clone(),
        format_table_row(&["URL", "Status", "Depth", "Links"], &TABLE_WIDTHS),
        separator.clone(),
    ];

    for page in pages {
        let status = page.status_code.to_string();
        let depth = page.depth.to_string();
        let links = page.links.len().to_string();
        lines.push(format_table_row(
            &[&page.url, &status, &depth, &links],
            &TABLE_WIDTHS,
        ));
    }

    lines.push(separator);
    lines.join("\n")
}

/// Two-line summary suited to embedded launchers
pub fn format_compact(result: &CrawlResult, output_dir: &Path) -> String {
    let duration = result.stats.duration.unwrap_or(0.0);
    format!(
        "Crawled {} pages ({} found) in {}\n{}",
        format_number(result.stats.pages_crawled),
        format_number(result.stats.pages_found),
        format_duration(duration),
        output_dir.display()
    )
}

pub fn format_failure(failure: &Failure) -> String {
    format!("Crawling failed ({}): {}", failure.kind, failure.detail)
}
