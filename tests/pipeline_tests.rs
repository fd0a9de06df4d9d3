//! End-to-end runs over a temporary directory with stand-in programs.

use mirror_backup_core::prelude::*;
use mirror_backup_core::{classify_output, ChangeSet};
use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RECORDED_OUTPUT: &str = include_str!("../demos/rsync-output.txt");

/// Writes an empty file where the archive would go.
struct TouchArchiver;

impl Archiver for TouchArchiver {
    fn create(&self, _source_dir: &Path, archive_path: &Path) -> Result<()> {
        fs::write(archive_path, b"").map_err(|err| CoreError::io(archive_path, err))
    }
}

#[derive(Default)]
struct Outbox {
    subjects: RefCell<Vec<String>>,
    bodies: RefCell<Vec<String>>,
}

struct OutboxMailer<'a>(&'a Outbox);

impl Mailer for OutboxMailer<'_> {
    fn send(&self, _config: &MailConfig, subject: &str, body: &str) -> Result<()> {
        self.0.subjects.borrow_mut().push(subject.to_string());
        self.0.bodies.borrow_mut().push(body.to_string());
        Ok(())
    }
}

fn at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(1, 30, 0)
        .unwrap()
}

fn write_config(root: &Path, extra: &str) -> Config {
    let output = root.join("rsync.txt");
    fs::write(&output, RECORDED_OUTPUT).unwrap();
    let content = format!(
        r#"
server_id = "www.example.org"
required_file_regex = 'backups/backup-.*\.zip$'

[sync]
mirror_dir = {mirror:?}

[archive]
dir = {archives:?}
keep_passed = 2
keep_failed = 1

[debug]
mock_sync_output = {output:?}
skip_mail = true
{extra}
"#,
        mirror = root.join("mirror").display().to_string(),
        archives = root.join("archives").display().to_string(),
        output = output.display().to_string(),
    );
    let path = root.join("mirror-backup.toml");
    fs::write(&path, content).unwrap();
    Config::load(&RealFileSystem, &path).unwrap()
}

fn archive_names(dir: &Path) -> Vec<String> {
    RealFileSystem.list_file_names(dir).unwrap()
}

#[test]
fn recorded_output_classifies() {
    assert_eq!(
        classify_output(RECORDED_OUTPUT).unwrap(),
        ChangeSet {
            deleted: vec![
                "wp-content/cache/page-2.html".to_string(),
                "wp-content/cache/".to_string(),
            ],
            added: vec![
                "wp-content/backups/backup-2024-05-04.zip".to_string(),
                "wp-content/uploads/logo.png".to_string(),
            ],
            modified: vec!["wp-config.php".to_string(), "index.php".to_string()],
        }
    );
}

#[test]
fn repeated_runs_rotate_archives() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path(), "");
    let fs = RealFileSystem;
    let outbox = Outbox::default();
    let collaborators = Collaborators {
        sync: Collaborators::from_config(&config, &fs).sync,
        archiver: Box::new(TouchArchiver),
        mailer: Box::new(OutboxMailer(&outbox)),
    };

    for day in 1..=4 {
        let report = run_backup(&config, &collaborators, &fs, at(day)).unwrap();
        assert_eq!(report.label, ReportLabel::Pass);
    }

    assert_eq!(
        archive_names(&config.archive.dir),
        vec![
            "backup_www.example.org_2024-05-03_01-30-00_passed.zip",
            "backup_www.example.org_2024-05-04_01-30-00_passed.zip",
        ]
    );
    let bodies = outbox.bodies.borrow();
    assert_eq!(bodies.len(), 4);
    assert!(bodies[3].contains("Deleted archives: 1 archive"));
    assert!(bodies[3].contains("  - backup_www.example.org_2024-05-02_01-30-00_passed.zip"));
    assert!(!bodies[0].contains("Deleted archives"));
}

#[test]
fn unrelated_files_survive_pruning() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path(), "");
    fs::create_dir_all(&config.archive.dir).unwrap();
    for name in [
        "backup_www.example.org_2024-04-01_00-00-00_passed.zip",
        "backup_www.example.org_2024-04-02_00-00-00_passed.zip",
        "backup_www.example.org_2024-04-03_00-00-00.zip",
        "backup_other.example.org_2024-04-01_00-00-00_passed.zip",
        "README.txt",
    ] {
        fs::write(config.archive.dir.join(name), b"").unwrap();
    }

    let real_fs = RealFileSystem;
    let outbox = Outbox::default();
    let collaborators = Collaborators {
        sync: Collaborators::from_config(&config, &real_fs).sync,
        archiver: Box::new(TouchArchiver),
        mailer: Box::new(OutboxMailer(&outbox)),
    };
    run_backup(&config, &collaborators, &real_fs, at(5)).unwrap();

    assert_eq!(
        archive_names(&config.archive.dir),
        vec![
            "README.txt",
            "backup_other.example.org_2024-04-01_00-00-00_passed.zip",
            "backup_www.example.org_2024-04-02_00-00-00_passed.zip",
            "backup_www.example.org_2024-04-03_00-00-00.zip",
            "backup_www.example.org_2024-05-05_01-30-00_passed.zip",
        ]
    );
}

#[test]
fn missing_required_file_fails_the_run_not_the_process() {
    let root = TempDir::new().unwrap();
    let mut config = write_config(root.path(), "");
    config.required_file_regex = r"\.tar\.gz$".to_string();
    let fs = RealFileSystem;
    let outbox = Outbox::default();
    let collaborators = Collaborators {
        sync: Collaborators::from_config(&config, &fs).sync,
        archiver: Box::new(TouchArchiver),
        mailer: Box::new(OutboxMailer(&outbox)),
    };

    let report = run_backup(&config, &collaborators, &fs, at(6)).unwrap();
    assert_eq!(report.label, ReportLabel::Fail);
    assert_eq!(
        outbox.subjects.borrow()[0],
        "[FAIL] Backup www.example.org 2024-05-06_01-30-00"
    );
    assert_eq!(
        archive_names(&config.archive.dir),
        vec!["backup_www.example.org_2024-05-06_01-30-00_failed.zip"]
    );
}

#[test]
fn skip_archive_uses_no_archiver() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path(), "skip_archive = true");
    let fs = RealFileSystem;
    let collaborators = Collaborators::from_config(&config, &fs);

    let report = run_backup(&config, &collaborators, &fs, at(7)).unwrap();
    assert_eq!(report.label, ReportLabel::Pass);
    assert!(archive_names(&config.archive.dir).is_empty());
    assert!(report.lines.contains(&"Current archives: 0 archives".to_string()));
}

#[test]
fn unparsable_output_produces_failure_notice_only() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path(), "");
    let bad = root.path().join("rsync.txt");
    fs::write(&bad, format!("{RECORDED_OUTPUT}??unexpected line format\n")).unwrap();

    let fs = RealFileSystem;
    let outbox = Outbox::default();
    let collaborators = Collaborators {
        sync: Collaborators::from_config(&config, &fs).sync,
        archiver: Box::new(TouchArchiver),
        mailer: Box::new(OutboxMailer(&outbox)),
    };

    let err = run_backup(&config, &collaborators, &fs, at(8)).unwrap_err();
    assert!(matches!(err, CoreError::Parse { line_number: 11, .. }));
    assert!(archive_names(&config.archive.dir).is_empty());
    assert!(outbox.subjects.borrow().is_empty());

    let notice = notify_failure(&config, collaborators.mailer.as_ref(), at(8), &err);
    assert_eq!(notice.label, ReportLabel::Error);
    assert_eq!(
        outbox.subjects.borrow().as_slice(),
        ["[ERROR] Backup www.example.org 2024-05-08_01-30-00"]
    );
    assert!(outbox.bodies.borrow()[0].contains("??unexpected line format"));
}
