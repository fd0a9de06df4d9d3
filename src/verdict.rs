//! Required-file check deciding whether a run passed.

use crate::models::Verdict;
use regex::Regex;

/// Keeps the added paths in which `pattern` finds a match.
///
/// The search is unanchored; anchors must be part of the pattern itself.
pub fn check_required_files<S: AsRef<str>>(added: &[S], pattern: &Regex) -> Verdict {
    let matched_required_files: Vec<String> = added
        .iter()
        .map(|path| path.as_ref())
        .filter(|path: &&str| pattern.is_match(path))
        .map(str::to_string)
        .collect();

    Verdict {
        passed: !matched_required_files.is_empty(),
        matched_required_files,
    }
}
