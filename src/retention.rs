//! Archive naming and count-based retention.
//!
//! Archives are named `backup_<server>_<YYYY-MM-DD>_<HH-MM-SS>_<category>.zip`.
//! Because the timestamp is zero-padded and largest-unit-first, names of one
//! server sort lexicographically in chronological order. Retention does not
//! rely on that: the sort key is the parsed timestamp.

use crate::helpers::{format_archive_timestamp, parse_archive_timestamp};
use crate::models::{ArchiveCategory, ArchiveEntry, CategoryRetention, RetentionOutcome};
use chrono::NaiveDateTime;

pub const ARCHIVE_PREFIX: &str = "backup_";
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Builds the file name of a new archive.
pub fn archive_file_name(
    server_id: &str,
    created_at: &NaiveDateTime,
    category: ArchiveCategory,
) -> String {
    format!(
        "{ARCHIVE_PREFIX}{server_id}_{}_{}{ARCHIVE_EXTENSION}",
        format_archive_timestamp(created_at),
        category.as_str()
    )
}

/// Why a file in the archive directory is left out of retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAnArchive,
    UnknownCategory,
    BadTimestamp,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAnArchive => "not a backup archive name",
            Self::UnknownCategory => "no passed/failed marker",
            Self::BadTimestamp => "unparsable timestamp",
        }
    }
}

impl ArchiveEntry {
    /// Reads an archive file name back into its parts.
    pub fn parse(file_name: &str) -> Result<Self, SkipReason> {
        let stem = file_name
            .strip_prefix(ARCHIVE_PREFIX)
            .and_then(|rest| rest.strip_suffix(ARCHIVE_EXTENSION))
            .ok_or(SkipReason::NotAnArchive)?;

        // The server id may contain `_`, so split from the right.
        let mut parts = stem.rsplitn(4, '_');
        let marker = parts.next().ok_or(SkipReason::NotAnArchive)?;
        let category = ArchiveCategory::from_marker(marker).ok_or(SkipReason::UnknownCategory)?;
        let (time, date, server_id) = match (parts.next(), parts.next(), parts.next()) {
            (Some(time), Some(date), Some(server)) if !server.is_empty() => (time, date, server),
            _ => return Err(SkipReason::BadTimestamp),
        };
        let sort_key =
            parse_archive_timestamp(&format!("{date}_{time}")).ok_or(SkipReason::BadTimestamp)?;

        Ok(Self {
            file_name: file_name.to_string(),
            server_id: server_id.to_string(),
            category,
            sort_key,
        })
    }
}

/// Turns a directory listing into the archives of one server.
///
/// Everything else is skipped with a warning and is never pruned.
pub fn scan_archives<S: AsRef<str>>(names: &[S], server_id: &str) -> Vec<ArchiveEntry> {
    let mut entries = Vec::new();
    for name in names {
        let name: &str = name.as_ref();
        match ArchiveEntry::parse(name) {
            Ok(entry) if entry.server_id == server_id => entries.push(entry),
            Ok(entry) => {
                tracing::warn!(
                    file = name,
                    server = %entry.server_id,
                    "archive belongs to another server; retention only covers this server's archives, leaving it untouched"
                );
            }
            Err(reason) => {
                tracing::warn!(
                    file = name,
                    reason = reason.as_str(),
                    "unrecognized file in archive directory, leaving it untouched"
                );
            }
        }
    }
    entries
}

/// Keeps the newest `keep_passed` passed and `keep_failed` failed archives.
///
/// A count of zero or less keeps none of that category.
pub fn apply_retention(
    entries: Vec<ArchiveEntry>,
    keep_passed: i64,
    keep_failed: i64,
) -> RetentionOutcome {
    let mut entries = entries;
    entries.sort_by(|a, b| {
        b.sort_key
            .cmp(&a.sort_key)
            .then_with(|| b.file_name.cmp(&a.file_name))
    });

    let (passed, failed): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|entry| entry.category == ArchiveCategory::Passed);

    let passed = retain_newest(passed, keep_passed);
    let failed = retain_newest(failed, keep_failed);

    let mut kept: Vec<ArchiveEntry> = passed.kept.iter().chain(&failed.kept).cloned().collect();
    kept.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    let mut deleted: Vec<ArchiveEntry> = passed
        .deleted
        .iter()
        .chain(&failed.deleted)
        .cloned()
        .collect();
    deleted.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    RetentionOutcome {
        passed,
        failed,
        kept,
        deleted,
    }
}

fn retain_newest(mut newest_first: Vec<ArchiveEntry>, keep: i64) -> CategoryRetention {
    let keep = usize::try_from(keep).unwrap_or(0).min(newest_first.len());
    let deleted = newest_first.split_off(keep);
    CategoryRetention {
        kept: newest_first,
        deleted,
    }
}
