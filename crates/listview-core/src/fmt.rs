//! Shared formatting helpers for table cells, footers and exports.

use chrono::NaiveDate;

use crate::record::DATE_FORMAT;

/// Format a number without a trailing `.0` for integral values.
///
/// `2.0` → `"2"`, `12.5` → `"12.5"`, `-0.25` → `"-0.25"`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Truncate text to `width` characters, marking the cut with `…`.
pub fn truncate(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}

/// Footer shown under every paged table.
pub fn format_page_footer(page: usize, total_pages: usize, total_records: usize) -> String {
    let noun = if total_records == 1 { "record" } else { "records" };
    format!(
        "Page {} of {} ({} {})",
        page, total_pages, total_records, noun
    )
}
