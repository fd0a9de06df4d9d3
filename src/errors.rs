use std::{io, path::PathBuf};

/// Shared error type for every stage of a backup run.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// A sync output line matched none of the recognized shapes.
    #[error("unrecognized sync output on line {line_number}: {line:?}")]
    Parse { line_number: usize, line: String },

    /// A configuration value is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file is not valid TOML for the expected schema.
    #[error("malformed configuration file")]
    ConfigSyntax(#[from] toml::de::Error),

    /// The required-file pattern does not compile.
    #[error("invalid required file pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// File system I/O failure.
    #[error("I/O error while accessing {0}")]
    Io(PathBuf, #[source] io::Error),

    /// An external program (rsync, zip, sendmail) failed.
    #[error("{program} failed: {message}")]
    Collaborator { program: String, message: String },
}

impl CoreError {
    pub fn parse(line_number: usize, line: impl Into<String>) -> Self {
        Self::Parse {
            line_number,
            line: line.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn collaborator(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            program: program.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }

    /// Full description including the chain of sources, for notifications.
    pub fn describe(&self) -> String {
        let mut text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        text
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
