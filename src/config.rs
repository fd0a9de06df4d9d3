//! Configuration file loading and validation.
//!
//! The configuration is a single TOML document:
//!
//! ```toml
//! server_id = "www.example.org"
//! required_file_regex = 'backup.*\.zip$'
//!
//! [sync]
//! source = "deploy@www.example.org:/var/www/html/"
//! mirror_dir = "/srv/mirror-backup/mirror"
//!
//! [archive]
//! dir = "/srv/mirror-backup/archives"
//! keep_passed = 14
//! keep_failed = 5
//!
//! [mail]
//! from = "backup@example.org"
//! to = ["ops@example.org"]
//! ```

use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "mirror-backup.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Label used in archive names and reports.
    pub server_id: String,
    /// Pattern an added file must match for the run to pass.
    pub required_file_regex: String,
    pub sync: SyncConfig,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// rsync source, local path or `[user@]host:path`.
    #[serde(default)]
    pub source: String,
    /// Local mirror kept between runs.
    pub mirror_dir: PathBuf,
    #[serde(default = "default_rsync_path")]
    pub rsync_path: String,
    /// Extra rsync arguments placed before the source, e.g. `-e "ssh -p 2222"`.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_rsync_path() -> String {
    "rsync".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub dir: PathBuf,
    pub keep_passed: i64,
    pub keep_failed: i64,
    #[serde(default = "default_zip_path")]
    pub zip_path: String,
}

fn default_zip_path() -> String {
    "zip".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,
}

fn default_sendmail_path() -> String {
    "/usr/sbin/sendmail".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: Vec::new(),
            sendmail_path: default_sendmail_path(),
        }
    }
}

/// Switches for dry runs and local testing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Read sync output from this file instead of running rsync.
    #[serde(default)]
    pub mock_sync_output: Option<PathBuf>,
    /// Do not run the archiver.
    #[serde(default)]
    pub skip_archive: bool,
    /// Log the report instead of mailing it.
    #[serde(default)]
    pub skip_mail: bool,
}

impl Config {
    /// Parses and validates a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates the configuration file at `path`.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            return Err(CoreError::config(format!(
                "configuration file {} does not exist",
                path.display()
            )));
        }
        let content = fs.read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), server = %config.server_id, "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_id.trim().is_empty() {
            return Err(CoreError::config("server_id must not be empty"));
        }
        if self.server_id.contains(['/', '\\']) {
            return Err(CoreError::config(format!(
                "server_id {:?} must not contain path separators",
                self.server_id
            )));
        }
        self.required_file_pattern()?;
        if self.sync.source.trim().is_empty() && self.debug.mock_sync_output.is_none() {
            return Err(CoreError::config("sync.source must not be empty"));
        }
        if !self.debug.skip_mail {
            if self.mail.to.is_empty() {
                return Err(CoreError::config("mail.to needs at least one recipient"));
            }
            if self.mail.from.trim().is_empty() {
                return Err(CoreError::config("mail.from must not be empty"));
            }
        }
        Ok(())
    }

    /// Compiles the required-file pattern.
    pub fn required_file_pattern(&self) -> Result<Regex> {
        Regex::new(&self.required_file_regex).map_err(|source| CoreError::InvalidPattern {
            pattern: self.required_file_regex.clone(),
            source,
        })
    }
}
