//! `plumb start`: run a command line through a shell, fire and forget.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::ActionError;
use crate::rules::vars::VarTable;

/// Pick the shell and its command flag.
///
/// The rule-defined `SHELL` and `SHELL_OPTS` are only used together; if
/// either is unbound both defaults apply.
pub fn select_shell<'a>(
    vars: &'a VarTable,
    default_shell: &'a str,
    default_opts: &'a str,
) -> (&'a str, &'a str) {
    match (vars.get("SHELL"), vars.get("SHELL_OPTS")) {
        (Some(shell), Some(opts)) => (shell, opts),
        _ => (default_shell, default_opts),
    }
}

/// Start `shell opts command` and return as soon as the process exists.
///
/// The child is neither awaited nor killed; its standard streams are
/// connected to the null device.
pub fn spawn_detached(shell: &str, opts: &str, command: &str) -> Result<(), ActionError> {
    let child = Command::new(shell)
        .arg(opts)
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false)
        .spawn()
        .map_err(|source| ActionError::SpawnFailed {
            command: command.to_string(),
            source,
        })?;

    debug!(pid = ?child.id(), shell, command, "Started command");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_unless_both_shell_vars_bound() {
        let mut vars = VarTable::new();
        assert_eq!(select_shell(&vars, "/bin/sh", "-c"), ("/bin/sh", "-c"));

        vars.set("SHELL", "/bin/rc");
        assert_eq!(select_shell(&vars, "/bin/sh", "-c"), ("/bin/sh", "-c"));

        vars.set("SHELL_OPTS", "-c");
        assert_eq!(select_shell(&vars, "/bin/sh", "-c"), ("/bin/rc", "-c"));
    }

    #[tokio::test]
    async fn spawned_command_runs() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let command = format!("echo hi > '{}'", marker.display());

        spawn_detached("/bin/sh", "-c", &command).unwrap();

        let mut waited = Duration::ZERO;
        while !marker.exists() && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }
        assert!(marker.exists(), "spawned command never ran");
    }

    #[tokio::test]
    async fn missing_shell_is_a_spawn_error() {
        let result = spawn_detached("/nonexistent/shell", "-c", "true");
        assert!(matches!(result, Err(ActionError::SpawnFailed { .. })));
    }
}
