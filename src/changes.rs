//! Folds itemized sync output into a [`ChangeSet`].

use crate::errors::{CoreError, Result};
use crate::helpers::split_output_lines;
use crate::itemize::{parse_line, ParsedLine};
use crate::models::ChangeSet;

/// Classifies every line, in order.
///
/// The first unrecognized line aborts the whole classification; no partial
/// change set is ever returned.
pub fn build_change_set<'a, I>(lines: I) -> Result<ChangeSet>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut changes = ChangeSet::default();
    let mut ignored = 0usize;

    for (index, line) in lines.into_iter().enumerate() {
        match parse_line(line) {
            Ok(ParsedLine::Change(record)) => {
                tracing::debug!(
                    line = index + 1,
                    change = record.label(),
                    path = record.path(),
                    "classified change"
                );
                changes.push(record);
            }
            Ok(ParsedLine::Ignored) => ignored += 1,
            Err(failure) => {
                tracing::debug!(line = index + 1, %failure, "classification aborted");
                return Err(CoreError::parse(index + 1, failure.line));
            }
        }
    }

    tracing::debug!(
        deleted = changes.deleted.len(),
        added = changes.added.len(),
        modified = changes.modified.len(),
        ignored,
        "classified sync output"
    );
    Ok(changes)
}

/// Splits raw sync output and classifies it.
pub fn classify_output(output: &str) -> Result<ChangeSet> {
    build_change_set(split_output_lines(output))
}
