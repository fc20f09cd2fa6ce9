//! The rule language: variables, expansion, line grammar, clause
//! evaluation and the per-message engine.
//!
//! A rule file is read top to bottom for every message:
//! 1. `name=value` lines set file-scope variables
//! 2. runs of `obj verb arg` lines separated by blank lines form rules
//! 3. the first rule whose clauses all hold triggers its `plumb` actions
//!    and ends the pass

pub mod clause;
pub mod engine;
pub mod expand;
pub mod line;
pub mod pattern;
pub mod scanner;
pub mod vars;

pub use engine::{Outcome, RuleEngine};
pub use expand::expand;
pub use pattern::RulePattern;
pub use vars::VarTable;
