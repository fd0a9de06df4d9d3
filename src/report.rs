//! Plain-text run reports.

use crate::helpers::pluralize;
use crate::models::{ChangeSet, ReportLabel, RetentionOutcome, RunReport, Verdict};

/// Everything a successful run reports on.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub server_id: &'a str,
    pub timestamp: &'a str,
    pub changes: &'a ChangeSet,
    pub verdict: &'a Verdict,
    pub required_pattern: &'a str,
    pub retention: &'a RetentionOutcome,
}

pub fn compose_report(input: ReportInput<'_>) -> RunReport {
    let label = if input.verdict.passed {
        ReportLabel::Pass
    } else {
        ReportLabel::Fail
    };

    let mut lines = vec![
        format!("Backup report for {} ({})", input.server_id, input.timestamp),
        format!("Result: {label}"),
        String::new(),
    ];

    push_listing(&mut lines, "Deleted", &input.changes.deleted);
    push_listing(&mut lines, "Added", &input.changes.added);
    push_listing(&mut lines, "Modified", &input.changes.modified);

    if input.verdict.passed {
        lines.push(format!(
            "Required files found (pattern {}):",
            input.required_pattern
        ));
        lines.extend(input.verdict.matched_required_files.iter().map(bullet));
    } else {
        lines.push(format!(
            "No added file matched the required file pattern {}.",
            input.required_pattern
        ));
    }
    lines.push(String::new());

    let kept = input.retention.kept_names();
    lines.push(format!(
        "Current archives: {}",
        pluralize(kept.len(), "archive", "archives")
    ));
    lines.extend(kept.iter().map(bullet));

    let deleted = input.retention.deleted_names();
    if !deleted.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Deleted archives: {}",
            pluralize(deleted.len(), "archive", "archives")
        ));
        lines.extend(deleted.iter().map(bullet));
    }

    RunReport {
        label,
        subject: subject(label, input.server_id, input.timestamp),
        lines,
    }
}

/// Notification for a run that stopped on an error.
pub fn compose_failure_report(server_id: &str, timestamp: &str, error: &str) -> RunReport {
    let label = ReportLabel::Error;
    RunReport {
        label,
        subject: subject(label, server_id, timestamp),
        lines: vec![
            format!("Backup run for {server_id} ({timestamp}) failed."),
            String::new(),
            error.to_string(),
        ],
    }
}

fn subject(label: ReportLabel, server_id: &str, timestamp: &str) -> String {
    format!("[{label}] Backup {server_id} {timestamp}")
}

fn push_listing(lines: &mut Vec<String>, heading: &str, paths: &[String]) {
    lines.push(format!(
        "{heading}: {}",
        pluralize(paths.len(), "file", "files")
    ));
    lines.extend(paths.iter().map(bullet));
    lines.push(String::new());
}

fn bullet(item: impl std::fmt::Display) -> String {
    format!("  - {item}")
}
