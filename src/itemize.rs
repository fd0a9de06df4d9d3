//! Parser for rsync's `--itemize-changes` output.
//!
//! Each itemized line starts with an 11-character change summary
//! `YXcstpoguax` followed by a space and the path:
//!
//! - `Y` update type: `<` sent, `>` received, `c` local change,
//!   `h` hard link, `.` not updated
//! - `X` file type: `f` file, `d` directory, `L` symlink, `D` device,
//!   `S` special file
//! - `cstpoguax` attribute flags, `.` when unchanged and `+` for every
//!   position when the item is new
//!
//! Deletions are reported as `*deleting` followed by padding and the path.

use crate::models::{ChangeRecord, TransferKind};
use regex::Regex;
use std::sync::LazyLock;

/// Literal marker rsync prints in place of the change summary for deletions.
pub const DELETION_MARKER: &str = "*deleting";

/// Attribute flags of an item that did not exist before the transfer.
pub const CREATED_ATTRIBUTES: &str = "+++++++++";

static DELETION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^{}\s+(?P<path>\S.*)$", regex::escape(DELETION_MARKER));
    Regex::new(&pattern).expect("invalid deletion line regex")
});

static ITEMIZED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<update>.)(?P<kind>.)(?P<attrs>[.+?A-Za-z ]{9}) (?P<path>.+)$")
        .expect("invalid itemized line regex")
});

/// Update type indicator (position 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    /// `<` sent to the remote side
    Sent,
    /// `>` received from the remote side
    Received,
    /// `c` created or changed locally
    LocalChange,
    /// `h` hard link to another item
    HardLink,
    /// `.` not updated, attributes may differ
    NotUpdated,
}

impl UpdateType {
    pub fn from_char(value: char) -> Option<Self> {
        match value {
            '<' => Some(Self::Sent),
            '>' => Some(Self::Received),
            'c' => Some(Self::LocalChange),
            'h' => Some(Self::HardLink),
            '.' => Some(Self::NotUpdated),
            _ => None,
        }
    }

    /// True when file content moved over the wire.
    pub fn is_transfer(self) -> bool {
        matches!(self, Self::Sent | Self::Received)
    }
}

/// File type indicator (position 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    RegularFile,
    Directory,
    Symlink,
    Device,
    Special,
}

impl FileType {
    pub fn from_char(value: char) -> Option<Self> {
        match value {
            'f' => Some(Self::RegularFile),
            'd' => Some(Self::Directory),
            'L' => Some(Self::Symlink),
            'D' => Some(Self::Device),
            'S' => Some(Self::Special),
            _ => None,
        }
    }
}

/// Result of parsing one recognized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Change(ChangeRecord),
    /// A well-formed itemized line that does not affect the change set.
    Ignored,
}

/// A line matching none of the recognized shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub line: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized sync output: {:?}", self.line)
    }
}

/// Parses a single line of itemized rsync output.
pub fn parse_line(line: &str) -> Result<ParsedLine, ParseFailure> {
    if let Some(caps) = DELETION_LINE.captures(line) {
        return Ok(ParsedLine::Change(ChangeRecord::Deleted {
            path: caps["path"].to_string(),
        }));
    }

    let failure = || ParseFailure {
        line: line.to_string(),
    };

    let caps = ITEMIZED_LINE.captures(line).ok_or_else(failure)?;
    let update = first_char(&caps["update"])
        .and_then(UpdateType::from_char)
        .ok_or_else(failure)?;
    let kind = first_char(&caps["kind"])
        .and_then(FileType::from_char)
        .ok_or_else(failure)?;

    if !update.is_transfer() || kind != FileType::RegularFile {
        return Ok(ParsedLine::Ignored);
    }

    let transfer = if &caps["attrs"] == CREATED_ATTRIBUTES {
        TransferKind::Added
    } else {
        TransferKind::Modified
    };
    Ok(ParsedLine::Change(ChangeRecord::Transferred {
        path: caps["path"].to_string(),
        kind: transfer,
    }))
}

fn first_char(value: &str) -> Option<char> {
    value.chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn transferred(path: &str, kind: TransferKind) -> ParsedLine {
        ParsedLine::Change(ChangeRecord::Transferred {
            path: path.to_string(),
            kind,
        })
    }

    #[rstest]
    #[case("*deleting   wp-content/old.php", "wp-content/old.php")]
    #[case("*deleting wp-content/cache/", "wp-content/cache/")]
    #[case("*deleting\tnotes with spaces.txt", "notes with spaces.txt")]
    fn deletion_lines(#[case] line: &str, #[case] path: &str) {
        assert_eq!(
            parse_line(line),
            Ok(ParsedLine::Change(ChangeRecord::Deleted {
                path: path.to_string()
            }))
        );
    }

    #[rstest]
    #[case(">f+++++++++ wp-content/uploads/a.jpg")]
    #[case("<f+++++++++ wp-content/uploads/a.jpg")]
    fn new_transferred_files_are_added(#[case] line: &str) {
        assert_eq!(
            parse_line(line),
            Ok(transferred("wp-content/uploads/a.jpg", TransferKind::Added))
        );
    }

    #[rstest]
    #[case(">fcst...... index.php")]
    #[case(">f..t...... index.php")]
    #[case(">f...p..... index.php")]
    #[case(">f.st...... index.php")]
    fn other_transferred_files_are_modified(#[case] line: &str) {
        assert_eq!(
            parse_line(line),
            Ok(transferred("index.php", TransferKind::Modified))
        );
    }

    #[rstest]
    #[case("cd+++++++++ wp-content/uploads/2024/")]
    #[case(".d..t...... ./")]
    #[case(">d+++++++++ wp-content/")]
    #[case(".f...p..... readme.html")]
    #[case("cL+++++++++ current -> releases/7")]
    #[case("hf+++++++++ hardlinked.txt")]
    #[case(".f          unchanged.txt")]
    fn non_content_lines_are_ignored(#[case] line: &str) {
        assert_eq!(parse_line(line), Ok(ParsedLine::Ignored));
    }

    #[rstest]
    #[case("??unexpected line format")]
    #[case("*f+++++++++ index.php")]
    #[case("?f+++++++++ index.php")]
    #[case(">x+++++++++ index.php")]
    #[case(">f+++++++++")]
    #[case(">f+++ index.php")]
    #[case("*deleting")]
    #[case("sending incremental file list")]
    #[case("")]
    fn unrecognized_lines_fail(#[case] line: &str) {
        assert_eq!(
            parse_line(line),
            Err(ParseFailure {
                line: line.to_string()
            })
        );
    }

    #[test]
    fn failure_names_the_offending_line() {
        let failure = parse_line("skipping non-regular file \"current\"").unwrap_err();
        assert_eq!(
            failure.to_string(),
            r#"unrecognized sync output: "skipping non-regular file \"current\"""#
        );
    }

    #[test]
    fn path_keeps_internal_spaces() {
        assert_eq!(
            parse_line(">f+++++++++ docs/My Report 2024.pdf"),
            Ok(transferred("docs/My Report 2024.pdf", TransferKind::Added))
        );
    }

    #[test]
    fn update_type_transfer_flags() {
        assert!(UpdateType::Received.is_transfer());
        assert!(UpdateType::Sent.is_transfer());
        assert!(!UpdateType::LocalChange.is_transfer());
        assert_eq!(UpdateType::from_char('*'), None);
    }
}
