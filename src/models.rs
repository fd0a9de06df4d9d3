use chrono::NaiveDateTime;

/// How a transferred regular file relates to the previous mirror state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TransferKind {
    Added,
    Modified,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
        }
    }
}

/// One classified line of sync output.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ChangeRecord {
    Deleted { path: String },
    Transferred { path: String, kind: TransferKind },
}

impl ChangeRecord {
    pub fn path(&self) -> &str {
        match self {
            Self::Deleted { path } | Self::Transferred { path, .. } => path,
        }
    }

    /// Which change list the record lands in.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deleted { .. } => "deleted",
            Self::Transferred { kind, .. } => kind.as_str(),
        }
    }
}

/// Paths touched by one sync, in the order the sync reported them.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ChangeSet {
    pub deleted: Vec<String>,
    pub added: Vec<String>,
    pub modified: Vec<String>,
}

impl ChangeSet {
    pub fn push(&mut self, record: ChangeRecord) {
        match record {
            ChangeRecord::Deleted { path } => self.deleted.push(path),
            ChangeRecord::Transferred {
                path,
                kind: TransferKind::Added,
            } => self.added.push(path),
            ChangeRecord::Transferred {
                path,
                kind: TransferKind::Modified,
            } => self.modified.push(path),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.added.is_empty() && self.modified.is_empty()
    }
}

/// Outcome of the required-file check.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Verdict {
    pub passed: bool,
    pub matched_required_files: Vec<String>,
}

impl Verdict {
    pub fn category(&self) -> ArchiveCategory {
        if self.passed {
            ArchiveCategory::Passed
        } else {
            ArchiveCategory::Failed
        }
    }
}

/// Pass/fail marker carried in every archive name.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ArchiveCategory {
    Passed,
    Failed,
}

impl ArchiveCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArchiveCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An archive file found in the archive directory.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub server_id: String,
    pub category: ArchiveCategory,
    pub sort_key: NaiveDateTime,
}

/// Kept and deleted archives of one category, newest first.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CategoryRetention {
    pub kept: Vec<ArchiveEntry>,
    pub deleted: Vec<ArchiveEntry>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RetentionOutcome {
    pub passed: CategoryRetention,
    pub failed: CategoryRetention,
    /// Kept archives of both categories, sorted by file name.
    pub kept: Vec<ArchiveEntry>,
    /// Archives to remove, sorted by file name.
    pub deleted: Vec<ArchiveEntry>,
}

impl RetentionOutcome {
    pub fn kept_names(&self) -> Vec<String> {
        self.kept.iter().map(|entry| entry.file_name.clone()).collect()
    }

    pub fn deleted_names(&self) -> Vec<String> {
        self.deleted
            .iter()
            .map(|entry| entry.file_name.clone())
            .collect()
    }
}

/// Label attached to the report subject.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReportLabel {
    Pass,
    Fail,
    Error,
}

impl ReportLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for ReportLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rendered report ready for the mailer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunReport {
    pub label: ReportLabel,
    pub subject: String,
    pub lines: Vec<String>,
}

impl RunReport {
    pub fn body(&self) -> String {
        let mut body = self.lines.join("\n");
        body.push('\n');
        body
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ExitStatusLike {
    Ok,
    Error,
}

impl ExitStatusLike {
    pub fn as_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Error => 1,
        }
    }
}
