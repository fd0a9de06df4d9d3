//! External programs the pipeline drives: rsync, zip and sendmail.
//!
//! Each program sits behind a small trait so runs can be exercised with
//! fakes. The process-backed implementations wait for the child to exit;
//! there is no timeout or retry here.

use crate::config::{MailConfig, SyncConfig};
use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;

/// Mirrors the remote tree and returns the itemized change output.
pub trait SyncRunner {
    fn run(&self, config: &SyncConfig) -> Result<String>;
}

/// Packs a directory into an archive file.
pub trait Archiver {
    fn create(&self, source_dir: &Path, archive_path: &Path) -> Result<()>;
}

/// Delivers a report.
pub trait Mailer {
    fn send(&self, config: &MailConfig, subject: &str, body: &str) -> Result<()>;
}

/// Runs rsync with `--itemize-changes` into the mirror directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsyncRunner;

impl RsyncRunner {
    /// Arguments passed to rsync, in order.
    pub fn arguments(config: &SyncConfig) -> Vec<String> {
        let mut args = vec![
            "--recursive".to_string(),
            "--links".to_string(),
            "--times".to_string(),
            "--compress".to_string(),
            "--delete".to_string(),
            "--itemize-changes".to_string(),
        ];
        args.extend(config.extra_args.iter().cloned());
        args.push(config.source.clone());
        args.push(with_trailing_slash(&config.mirror_dir));
        args
    }
}

impl SyncRunner for RsyncRunner {
    fn run(&self, config: &SyncConfig) -> Result<String> {
        let args = Self::arguments(config);
        tracing::info!(program = %config.rsync_path, source = %config.source, "syncing mirror");
        let output = Command::new(&config.rsync_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| CoreError::collaborator(&config.rsync_path, err.to_string()))?;
        let output = check_status(&config.rsync_path, output)?;
        String::from_utf8(output.stdout).map_err(|_| {
            CoreError::collaborator(&config.rsync_path, "output is not valid UTF-8")
        })
    }
}

/// Replays recorded sync output from a file.
pub struct MockSyncRunner<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> MockSyncRunner<'a> {
    pub fn new(fs: &'a dyn FileSystem, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl SyncRunner for MockSyncRunner<'_> {
    fn run(&self, _config: &SyncConfig) -> Result<String> {
        tracing::info!(path = %self.path.display(), "using recorded sync output");
        self.fs.read_to_string(&self.path)
    }
}

/// Runs `zip -r -q <archive> .` inside the source directory.
#[derive(Debug, Clone)]
pub struct ZipArchiver {
    program: String,
}

impl ZipArchiver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Archiver for ZipArchiver {
    fn create(&self, source_dir: &Path, archive_path: &Path) -> Result<()> {
        tracing::info!(
            source = %source_dir.display(),
            archive = %archive_path.display(),
            "creating archive"
        );
        // zip runs inside the source directory, so a relative target would move.
        let target = std::path::absolute(archive_path)
            .map_err(|err| CoreError::io(archive_path, err))?;
        let output = Command::new(&self.program)
            .arg("-r")
            .arg("-q")
            .arg(&target)
            .arg(".")
            .current_dir(source_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| CoreError::collaborator(&self.program, err.to_string()))?;
        check_status(&self.program, output)?;
        Ok(())
    }
}

/// Skips archiving; used when `debug.skip_archive` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopArchiver;

impl Archiver for NoopArchiver {
    fn create(&self, _source_dir: &Path, archive_path: &Path) -> Result<()> {
        tracing::info!(archive = %archive_path.display(), "archive step skipped");
        Ok(())
    }
}

/// Pipes the message into `sendmail -t -i`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendmailMailer;

impl Mailer for SendmailMailer {
    fn send(&self, config: &MailConfig, subject: &str, body: &str) -> Result<()> {
        let program = &config.sendmail_path;
        let message = compose_message(config, subject, body);
        tracing::info!(to = %config.to.join(", "), subject, "sending report");

        let mut child = Command::new(program)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| CoreError::collaborator(program, err.to_string()))?;
        // stdin is fed from a second thread so stderr drains meanwhile, and
        // the child is reaped even when it stops reading early.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || stdin.write_all(message.as_bytes()))
        });
        let output = child.wait_with_output();
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| CoreError::collaborator(program, "stdin writer panicked"))?
                .map_err(|err| CoreError::collaborator(program, err.to_string()))?;
        }
        let output = output.map_err(|err| CoreError::collaborator(program, err.to_string()))?;
        check_status(program, output)?;
        Ok(())
    }
}

/// Writes the report to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, _config: &MailConfig, subject: &str, body: &str) -> Result<()> {
        tracing::info!(subject, "mail skipped, report follows\n{body}");
        Ok(())
    }
}

/// Renders a plain-text message with the headers sendmail reads with `-t`.
pub fn compose_message(config: &MailConfig, subject: &str, body: &str) -> String {
    format!(
        "From: {}\nTo: {}\nSubject: {}\nContent-Type: text/plain; charset=utf-8\n\n{}",
        config.from,
        config.to.join(", "),
        subject.replace(['\r', '\n'], " "),
        body
    )
}

fn check_status(program: &str, output: Output) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let message = if stderr.is_empty() {
        output.status.to_string()
    } else {
        format!("{}: {stderr}", output.status)
    };
    Err(CoreError::collaborator(program, message))
}

fn with_trailing_slash(path: &Path) -> String {
    let mut value = path.display().to_string();
    if !value.ends_with('/') {
        value.push('/');
    }
    value
}
