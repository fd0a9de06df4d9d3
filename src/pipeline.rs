//! One backup run, start to finish.

use crate::changes::classify_output;
use crate::config::Config;
use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use crate::helpers::format_archive_timestamp;
use crate::models::RunReport;
use crate::process::{
    Archiver, LogMailer, Mailer, MockSyncRunner, NoopArchiver, RsyncRunner, SendmailMailer,
    SyncRunner, ZipArchiver,
};
use crate::report::{compose_failure_report, compose_report, ReportInput};
use crate::retention::{apply_retention, archive_file_name, scan_archives};
use crate::verdict::check_required_files;
use chrono::NaiveDateTime;

/// The external programs a run talks to.
pub struct Collaborators<'a> {
    pub sync: Box<dyn SyncRunner + 'a>,
    pub archiver: Box<dyn Archiver + 'a>,
    pub mailer: Box<dyn Mailer + 'a>,
}

impl<'a> Collaborators<'a> {
    /// Picks real or stand-in collaborators according to `config.debug`.
    pub fn from_config(config: &Config, fs: &'a dyn FileSystem) -> Self {
        let sync: Box<dyn SyncRunner + 'a> = match &config.debug.mock_sync_output {
            Some(path) => Box::new(MockSyncRunner::new(fs, path)),
            None => Box::new(RsyncRunner),
        };
        let archiver: Box<dyn Archiver + 'a> = if config.debug.skip_archive {
            Box::new(NoopArchiver)
        } else {
            Box::new(ZipArchiver::new(&config.archive.zip_path))
        };
        let mailer: Box<dyn Mailer + 'a> = if config.debug.skip_mail {
            Box::new(LogMailer)
        } else {
            Box::new(SendmailMailer)
        };
        Self {
            sync,
            archiver,
            mailer,
        }
    }
}

/// Syncs, classifies, archives, prunes and mails the report.
///
/// Any error aborts the remaining stages; nothing is mailed in that case
/// and the caller is expected to call [`notify_failure`].
pub fn run_backup(
    config: &Config,
    collaborators: &Collaborators<'_>,
    fs: &dyn FileSystem,
    now: NaiveDateTime,
) -> Result<RunReport> {
    let pattern = config.required_file_pattern()?;
    let timestamp = format_archive_timestamp(&now);
    tracing::info!(server = %config.server_id, %timestamp, "starting backup run");

    fs.create_dir_all(&config.sync.mirror_dir)?;
    fs.create_dir_all(&config.archive.dir)?;

    let output = collaborators.sync.run(&config.sync)?;
    let changes = classify_output(&output)?;
    tracing::info!(
        deleted = changes.deleted.len(),
        added = changes.added.len(),
        modified = changes.modified.len(),
        "sync output classified"
    );

    let verdict = check_required_files(&changes.added, &pattern);
    if verdict.passed {
        tracing::info!(matched = verdict.matched_required_files.len(), "required files present");
    } else {
        tracing::warn!(pattern = %config.required_file_regex, "no added file matched the required file pattern");
    }

    let archive_name = archive_file_name(&config.server_id, &now, verdict.category());
    collaborators
        .archiver
        .create(&config.sync.mirror_dir, &config.archive.dir.join(&archive_name))?;

    let listing = fs.list_file_names(&config.archive.dir)?;
    let retention = apply_retention(
        scan_archives(&listing, &config.server_id),
        config.archive.keep_passed,
        config.archive.keep_failed,
    );
    for entry in &retention.deleted {
        tracing::info!(archive = %entry.file_name, "removing old archive");
        fs.remove_file(&config.archive.dir.join(&entry.file_name))?;
    }

    let report = compose_report(ReportInput {
        server_id: &config.server_id,
        timestamp: &timestamp,
        changes: &changes,
        verdict: &verdict,
        required_pattern: &config.required_file_regex,
        retention: &retention,
    });
    collaborators
        .mailer
        .send(&config.mail, &report.subject, &report.body())?;
    tracing::info!(result = %report.label, "backup run finished");
    Ok(report)
}

/// Best-effort failure notification. A delivery failure is only logged.
pub fn notify_failure(
    config: &Config,
    mailer: &dyn Mailer,
    now: NaiveDateTime,
    error: &CoreError,
) -> RunReport {
    let timestamp = format_archive_timestamp(&now);
    let report = compose_failure_report(&config.server_id, &timestamp, &error.describe());
    if let Err(send_error) = mailer.send(&config.mail, &report.subject, &report.body()) {
        tracing::error!(error = %send_error.describe(), "could not send failure notification");
    }
    report
}
