//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use tabled::{builder::Builder, settings::Style};

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Counts characters rather than bytes, so descriptions in any script are
/// cut on a character boundary.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format a money value with two decimals
pub fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

/// Render rows as a markdown table
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for row in rows {
        builder.push_record(row.iter().map(String::as_str));
    }
    builder.build().with(Style::markdown()).to_string()
}

/// Render rows as CSV with a header line
pub fn csv_lines(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = headers.join(",");
    for row in rows {
        out.push('\n');
        let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
        out.push_str(&cells.join(","));
    }
    out
}

/// Render rows as tab-separated values with a header line
pub fn tsv_lines(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = headers.join("\t");
    for row in rows {
        out.push('\n');
        let cells: Vec<String> = row.iter().map(|c| c.replace(['\t', '\n'], " ")).collect();
        out.push_str(&cells.join("\t"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("产品检索工具清单", 5), "产品...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(50.0), "50.00");
        assert_eq!(format_money(1.005), "1.00");
    }

    #[test]
    fn test_csv_and_tsv_lines() {
        let rows = vec![vec!["1".to_string(), "Gadget, large".to_string()]];
        assert_eq!(csv_lines(&["EAN", "DESCRIPTION"], &rows), "EAN,DESCRIPTION\n1,\"Gadget, large\"");
        assert_eq!(tsv_lines(&["EAN", "DESCRIPTION"], &rows), "EAN\tDESCRIPTION\n1\tGadget, large");
    }

    #[test]
    fn test_markdown_table() {
        let rows = vec![vec!["1".to_string(), "Widget".to_string()]];
        let table = markdown_table(&["EAN", "DESCRIPTION"], &rows);
        assert!(table.contains("| EAN"));
        assert!(table.contains("Widget"));
    }
}
