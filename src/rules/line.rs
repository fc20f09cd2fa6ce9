//! Rule file line classification.

use crate::error::AssignmentError;
use crate::rules::expand::is_name_char;

/// What a trimmed rule-file line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty line; terminates a rule group.
    Blank,
    /// Starts with `#`.
    Comment,
    /// `name=value`, with the `=` before any whitespace.
    Assignment,
    /// `obj verb arg...`.
    Pattern,
    /// Anything else, e.g. a single bare word.
    Malformed,
}

/// Trim the whitespace the classifier ignores around a raw line.
pub fn trim_line(raw: &str) -> &str {
    raw.trim_matches([' ', '\t', '\r'])
}

/// Classify a line that has already been trimmed.
pub fn classify(line: &str) -> LineKind {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with('#') {
        return LineKind::Comment;
    }
    for c in line.chars() {
        match c {
            ' ' | '\t' => return LineKind::Pattern,
            '=' => return LineKind::Assignment,
            _ => {}
        }
    }
    LineKind::Malformed
}

/// A parsed `name=value` line. The value is still unexpanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Split an assignment line and validate the variable name.
///
/// Names are ASCII letters, digits and `_`, and may not start with a digit
/// so that `$0`..`$9` stay reserved for `matches`.
pub fn parse_assignment(line: &str) -> Result<Assignment<'_>, AssignmentError> {
    let (name, value) = line.split_once('=').ok_or(AssignmentError::MissingEquals)?;

    if name.is_empty() {
        return Err(AssignmentError::EmptyName);
    }
    if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(AssignmentError::InvalidNameChar {
            name: name.to_string(),
            bad,
        });
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(AssignmentError::LeadingDigit(name.to_string()));
    }
    Ok(Assignment { name, value })
}
