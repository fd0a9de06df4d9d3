//! Shared utility helpers for run timestamps and sync output handling.

use chrono::NaiveDateTime;

/// Timestamp layout embedded in archive names and report headers.
///
/// Zero-padded and largest-unit-first, with `-` instead of `:` so the value
/// is filename-safe and sorts the same way as a string and as a date.
pub const ARCHIVE_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Serializes a run timestamp into the archive format.
pub fn format_archive_timestamp(time: &NaiveDateTime) -> String {
    time.format(ARCHIVE_TIME_FORMAT).to_string()
}

/// Parses a timestamp written by [`format_archive_timestamp`].
pub fn parse_archive_timestamp(value: &str) -> Option<NaiveDateTime> {
    // chrono accepts unpadded fields; the layout relies on padding.
    if value.len() != "YYYY-MM-DD_HH-MM-SS".len() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, ARCHIVE_TIME_FORMAT).ok()
}

/// Splits raw sync output into lines.
///
/// Exactly one trailing empty segment (left by the final newline) is
/// dropped; any other empty line is kept and handed to the parser. A `\r`
/// before the newline is stripped.
pub fn split_output_lines(output: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = output
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Renders a count with a singular or plural noun.
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
