//! `plumb to` and the path handling shared with `isfile`/`isdir`.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::ActionError;

/// Resolve a rule argument to an absolute path: absolute arguments are kept,
/// relative ones are taken against the message's working directory, or `/`
/// when the message carries none.
pub fn resolve_path(arg: &str, wdir: &str) -> PathBuf {
    let path = Path::new(arg);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let base = if wdir.is_empty() { "/" } else { wdir };
    Path::new("/").join(base).join(path)
}

/// Append `text` plus a newline to `path`, creating the file if absent.
///
/// The whole line is handed to the OS as one write on an `O_APPEND`
/// descriptor, so concurrent appenders interleave by line.
pub async fn append_line(path: &Path, text: &str) -> Result<(), ActionError> {
    let err = |source| ActionError::AppendFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(err)?;

    let mut line = String::with_capacity(text.len() + 1);
    line.push_str(text);
    line.push('\n');

    file.write_all(line.as_bytes()).await.map_err(err)?;
    file.flush().await.map_err(err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn relative_paths_join_wdir() {
        assert_eq!(
            resolve_path("notes.txt", "/home/glenda"),
            PathBuf::from("/home/glenda/notes.txt")
        );
        assert_eq!(
            resolve_path("/etc/motd", "/home/glenda"),
            PathBuf::from("/etc/motd")
        );
    }

    #[test]
    fn missing_wdir_resolves_from_root() {
        assert_eq!(resolve_path("Cargo.toml", ""), PathBuf::from("/Cargo.toml"));
        assert_eq!(resolve_path("a/b", "rel"), PathBuf::from("/rel/a/b"));
        assert!(resolve_path("x", "").is_absolute());
    }

    #[tokio::test]
    async fn appends_lines_and_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        append_line(&path, "first").await.unwrap();
        append_line(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[tokio::test]
    async fn append_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no/such/dir/out.log");
        let result = append_line(&path, "x").await;
        assert!(matches!(result, Err(ActionError::AppendFailed { .. })));
    }
}
