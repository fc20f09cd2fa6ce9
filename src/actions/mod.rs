//! Side effects triggered by `plumb` clauses.
//!
//! The evaluator talks to an [`ActionExecutor`]; [`SystemActions`] is the
//! real one. Failures are reported back but never change a clause's verdict.

pub mod file;
pub mod shell;

use std::path::Path;

use async_trait::async_trait;

use crate::config::PlumberConfig;
use crate::error::ActionError;
use crate::rules::vars::VarTable;

pub use file::resolve_path;

/// Performs `plumb start` and `plumb to`.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Launch `command` through a shell without waiting for it.
    async fn spawn(&self, command: &str, vars: &VarTable) -> Result<(), ActionError>;

    /// Append `text` and a newline to `path`, creating it if needed.
    async fn append(&self, path: &Path, text: &str) -> Result<(), ActionError>;
}

/// Executor backed by real processes and files.
#[derive(Debug, Clone)]
pub struct SystemActions {
    default_shell: String,
    default_shell_opts: String,
}

impl SystemActions {
    pub fn new(default_shell: impl Into<String>, default_shell_opts: impl Into<String>) -> Self {
        Self {
            default_shell: default_shell.into(),
            default_shell_opts: default_shell_opts.into(),
        }
    }

    pub fn from_config(config: &PlumberConfig) -> Self {
        Self::new(&config.default_shell, &config.default_shell_opts)
    }
}

impl Default for SystemActions {
    fn default() -> Self {
        Self::from_config(&PlumberConfig::default())
    }
}

#[async_trait]
impl ActionExecutor for SystemActions {
    async fn spawn(&self, command: &str, vars: &VarTable) -> Result<(), ActionError> {
        let (shell, opts) =
            shell::select_shell(vars, &self.default_shell, &self.default_shell_opts);
        shell::spawn_detached(shell, opts, command)
    }

    async fn append(&self, path: &Path, text: &str) -> Result<(), ActionError> {
        file::append_line(path, text).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording executor for evaluator tests.

    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ActionCall {
        Spawn(String),
        Append(PathBuf, String),
    }

    #[derive(Debug, Default)]
    pub struct RecordingActions {
        calls: Mutex<Vec<ActionCall>>,
    }

    impl RecordingActions {
        pub fn calls(&self) -> Vec<ActionCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ActionExecutor for RecordingActions {
        async fn spawn(&self, command: &str, _vars: &VarTable) -> Result<(), ActionError> {
            self.calls
                .lock()
                .unwrap()
                .push(ActionCall::Spawn(command.to_string()));
            Ok(())
        }

        async fn append(&self, path: &Path, text: &str) -> Result<(), ActionError> {
            self.calls
                .lock()
                .unwrap()
                .push(ActionCall::Append(path.to_path_buf(), text.to_string()));
            Ok(())
        }
    }
}
