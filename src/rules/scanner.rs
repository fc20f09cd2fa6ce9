//! Rule file state machine.
//!
//! Lines are fed one at a time. Consecutive pattern lines form a group; a
//! blank line closes it and hands it back for evaluation. Assignments update
//! the file-scope table immediately. Anything that breaks a group (a bad
//! pattern, an assignment, a malformed line) turns it invalid until the
//! next blank line.

use std::mem;

use tracing::{debug, warn};

use crate::error::RuleError;
use crate::rules::expand::expand;
use crate::rules::line::{LineKind, classify, parse_assignment, trim_line};
use crate::rules::pattern::RulePattern;
use crate::rules::vars::VarTable;

/// A clause group ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup {
    /// 1-based line of the first clause.
    pub first_line: usize,
    pub patterns: Vec<RulePattern>,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    Invalid,
}

#[derive(Debug)]
enum ScanState {
    Idle,
    Capturing(RuleGroup),
    Invalid,
}

/// Drives one message's pass over the rule file.
#[derive(Debug)]
pub struct RuleScanner {
    state: ScanState,
    vars: VarTable,
    line: usize,
}

impl RuleScanner {
    /// Start a pass with `vars` as the file-scope table.
    pub fn new(vars: VarTable) -> Self {
        Self {
            state: ScanState::Idle,
            vars,
            line: 0,
        }
    }

    /// File-scope variables as they stand after the lines fed so far.
    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    #[cfg(test)]
    fn phase(&self) -> Phase {
        match self.state {
            ScanState::Idle => Phase::Idle,
            ScanState::Capturing(_) => Phase::Capturing,
            ScanState::Invalid => Phase::Invalid,
        }
    }

    #[cfg(test)]
    fn line(&self) -> usize {
        self.line
    }

    /// Feed the next raw line. Returns a group when a blank line closes a
    /// valid one.
    pub fn feed(&mut self, raw: &str) -> Option<RuleGroup> {
        self.line += 1;
        let line = trim_line(raw);

        match classify(line) {
            LineKind::Comment => None,
            LineKind::Blank => match mem::replace(&mut self.state, ScanState::Idle) {
                ScanState::Capturing(group) => Some(group),
                ScanState::Idle | ScanState::Invalid => None,
            },
            LineKind::Assignment => {
                self.assign(line);
                if let ScanState::Capturing(group) = &self.state {
                    warn!(
                        line = self.line,
                        rule_line = group.first_line,
                        "Variable declared inside a rule; rule discarded"
                    );
                    self.state = ScanState::Invalid;
                }
                None
            }
            LineKind::Pattern => {
                self.capture(line);
                None
            }
            LineKind::Malformed => {
                self.syntax_error(RuleError::Malformed {
                    line: self.line,
                    text: line.to_string(),
                });
                None
            }
        }
    }

    /// End of file. A group still open here had no closing blank line and
    /// is never evaluated; it is returned only for reporting.
    pub fn finish(self) -> Option<RuleGroup> {
        match self.state {
            ScanState::Capturing(group) => {
                debug!(
                    rule_line = group.first_line,
                    "Rule not terminated by a blank line; ignored"
                );
                Some(group)
            }
            ScanState::Idle | ScanState::Invalid => None,
        }
    }

    fn capture(&mut self, line: &str) {
        if matches!(self.state, ScanState::Invalid) {
            return;
        }
        let Some(pattern) = RulePattern::compile(line) else {
            self.syntax_error(RuleError::Pattern {
                line: self.line,
                text: line.to_string(),
            });
            return;
        };
        if let ScanState::Capturing(group) = &mut self.state {
            group.patterns.push(pattern);
        } else {
            self.state = ScanState::Capturing(RuleGroup {
                first_line: self.line,
                patterns: vec![pattern],
            });
        }
    }

    fn assign(&mut self, line: &str) {
        let assignment = match parse_assignment(line) {
            Ok(a) => a,
            Err(source) => {
                let err = RuleError::Assignment {
                    line: self.line,
                    source,
                };
                warn!(error = %err, "Rule syntax error");
                return;
            }
        };
        match expand(assignment.value, &self.vars) {
            Ok(value) => self.vars.set(assignment.name, value),
            Err(source) => {
                let err = RuleError::Expand {
                    line: self.line,
                    source,
                };
                warn!(error = %err, "Rule syntax error");
            }
        }
    }

    fn syntax_error(&mut self, err: RuleError) {
        warn!(error = %err, "Rule syntax error");
        self.state = ScanState::Invalid;
    }
}
