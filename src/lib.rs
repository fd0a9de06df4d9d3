//! Core of the mirror backup tool.
//!
//! A run mirrors a remote tree with rsync, classifies the itemized output
//! into added, modified and deleted files, checks that a required file
//! arrived, archives the mirror, prunes old archives and mails a report.
//! The classification and retention logic is pure; the external programs
//! sit behind the traits in [`process`] and the filesystem behind [`fs`].

pub mod changes;
pub mod config;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod itemize;
pub mod models;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod retention;
pub mod verdict;

pub use changes::{build_change_set, classify_output};
pub use config::{ArchiveConfig, Config, DebugConfig, MailConfig, SyncConfig, DEFAULT_CONFIG_FILE};
pub use errors::{CoreError, Result};
pub use fs::{FileSystem, RealFileSystem};
pub use helpers::{
    format_archive_timestamp,
    parse_archive_timestamp,
    split_output_lines,
    ARCHIVE_TIME_FORMAT,
};
pub use itemize::{parse_line, FileType, ParseFailure, ParsedLine, UpdateType};
pub use models::{
    ArchiveCategory,
    ArchiveEntry,
    CategoryRetention,
    ChangeRecord,
    ChangeSet,
    ExitStatusLike,
    ReportLabel,
    RetentionOutcome,
    RunReport,
    TransferKind,
    Verdict,
};
pub use pipeline::{notify_failure, run_backup, Collaborators};
pub use process::{Archiver, Mailer, SyncRunner};
pub use report::{compose_failure_report, compose_report, ReportInput};
pub use retention::{apply_retention, archive_file_name, scan_archives};
pub use verdict::check_required_files;

/// Re-export a small stable API surface for the binary and tests.
pub mod prelude {
    pub use crate::{
        config::*,
        errors::{CoreError, Result},
        fs::{FileSystem, RealFileSystem},
        models::*,
        pipeline::*,
        process::*,
    };
}
