//! Per-message rule evaluation.
//!
//! Each message gets its own pass over the rule file and its own variable
//! table. Groups are evaluated as they close; the first group whose clauses
//! all hold wins and nothing after it is read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::actions::ActionExecutor;
use crate::error::RuleError;
use crate::message::Message;
use crate::rules::clause;
use crate::rules::scanner::{RuleGroup, RuleScanner};
use crate::rules::vars::VarTable;

/// How a message's pass over the rules ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The group starting at `line` matched and its actions ran.
    Matched { line: usize },
    /// End of file without a matching group.
    NoMatch,
}

/// Evaluates messages against a rule file.
pub struct RuleEngine {
    rules_file: PathBuf,
    actions: Arc<dyn ActionExecutor>,
}

impl RuleEngine {
    pub fn new(rules_file: impl Into<PathBuf>, actions: Arc<dyn ActionExecutor>) -> Self {
        Self {
            rules_file: rules_file.into(),
            actions,
        }
    }

    pub fn rules_file(&self) -> &Path {
        &self.rules_file
    }

    /// Decode one envelope and evaluate it.
    pub async fn process(&self, raw: &[u8]) -> crate::error::Result<Outcome> {
        let msg = Message::decode(raw)?;
        debug!(src = %msg.src, dst = %msg.dst, kind = %msg.kind, "Decoded message");
        Ok(self.run(&msg).await?)
    }

    /// Evaluate a decoded message. The rule file is reopened on every call.
    pub async fn run(&self, msg: &Message) -> Result<Outcome, RuleError> {
        let io_err = |source| RuleError::Io {
            path: self.rules_file.clone(),
            source,
        };
        let file = File::open(&self.rules_file).await.map_err(io_err)?;
        evaluate_rules(
            BufReader::new(file),
            VarTable::from_message(msg),
            self.actions.as_ref(),
        )
        .await
        .map_err(io_err)
    }
}

/// Scan rules from `reader`, starting from the file-scope table `vars`.
pub async fn evaluate_rules<R>(
    reader: R,
    vars: VarTable,
    actions: &dyn ActionExecutor,
) -> std::io::Result<Outcome>
where
    R: AsyncBufRead + Unpin,
{
    let mut scanner = RuleScanner::new(vars);
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let Some(group) = scanner.feed(&line) else {
            continue;
        };
        // Group-scope changes live in this copy only.
        let mut working = scanner.vars().clone();
        if evaluate_group(&group, &mut working, actions).await {
            info!(rule_line = group.first_line, "Rule matched");
            return Ok(Outcome::Matched {
                line: group.first_line,
            });
        }
    }

    scanner.finish();
    Ok(Outcome::NoMatch)
}

/// Evaluate a group's clauses in order, stopping at the first that is false
/// or fails. Side effects of the clauses already run stay in `vars`.
pub async fn evaluate_group(
    group: &RuleGroup,
    vars: &mut VarTable,
    actions: &dyn ActionExecutor,
) -> bool {
    if group.patterns.is_empty() {
        return false;
    }
    for pattern in &group.patterns {
        match clause::evaluate(pattern, vars, actions).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                warn!(
                    rule_line = group.first_line,
                    obj = %pattern.obj,
                    verb = %pattern.verb,
                    error = %e,
                    "Clause failed"
                );
                return false;
            }
        }
    }
    true
}
