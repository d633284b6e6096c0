//! Report module for presenting validated crawl results
//!
//! This module handles:
//! - Plain-text statistics, page details, and summary tables
//! - Markdown summaries written next to the result artifact

mod markdown;
mod text;

pub use markdown::{format_markdown_summary, write_markdown_summary, SUMMARY_FILE};
pub use text::{
    format_bytes, format_compact, format_duration, format_failure, format_number, format_page,
    format_speed, format_stats, format_table_row, progress_bar, summary_table, MAX_LINKS_SHOWN,
    TABLE_WIDTHS,
};
