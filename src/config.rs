//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default rules file.
pub const DEFAULT_RULES_FILE: &str = "/mnt/plumb/rules";

/// Default inbound channel.
pub const DEFAULT_PLUMB_FILE: &str = "/mnt/plumb/send";

/// Default log file.
pub const DEFAULT_LOG_FILE: &str = "/mnt/plumb/log";

/// How the bytes drained from the inbound channel are split into envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Every non-empty drain is one envelope.
    #[default]
    Blob,
    /// One envelope per newline-terminated line.
    Lines,
}

impl FromStr for Framing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blob" => Ok(Self::Blob),
            "lines" | "line" => Ok(Self::Lines),
            other => Err(ConfigError::InvalidValue {
                key: "framing".to_string(),
                message: format!("expected 'blob' or 'lines', got '{other}'"),
            }),
        }
    }
}

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct PlumberConfig {
    /// Rule file scanned for every message.
    pub rules_file: PathBuf,
    /// Inbound channel the client writes envelopes into.
    pub plumb_file: PathBuf,
    /// Log sink (ignored in debug mode).
    pub log_file: PathBuf,
    /// Log to stdout at debug level.
    pub debug: bool,
    /// Pause between two drains of the inbound channel.
    pub poll_interval: Duration,
    /// Maximum number of messages evaluated at the same time.
    pub max_concurrent: usize,
    pub framing: Framing,
    /// Shell used by `plumb start` unless `SHELL` and `SHELL_OPTS` are both set.
    pub default_shell: String,
    pub default_shell_opts: String,
}

impl Default for PlumberConfig {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from(DEFAULT_RULES_FILE),
            plumb_file: PathBuf::from(DEFAULT_PLUMB_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug: false,
            poll_interval: Duration::from_millis(50),
            max_concurrent: 64,
            framing: Framing::Blob,
            default_shell: "/bin/sh".to_string(),
            default_shell_opts: "-c".to_string(),
        }
    }
}

impl PlumberConfig {
    /// Build config from environment variables, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rules_file = std::env::var("PLUMBER_RULES")
            .map(PathBuf::from)
            .unwrap_or(defaults.rules_file);

        let plumb_file = std::env::var("PLUMBER_SEND")
            .map(PathBuf::from)
            .unwrap_or(defaults.plumb_file);

        let log_file = std::env::var("PLUMBER_LOG")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        let poll_interval = std::env::var("PLUMBER_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let max_concurrent: usize = std::env::var("PLUMBER_MAX_CONCURRENT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_concurrent);

        let framing = std::env::var("PLUMBER_FRAMING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.framing);

        Self {
            rules_file,
            plumb_file,
            log_file,
            poll_interval,
            max_concurrent,
            framing,
            ..defaults
        }
    }

    /// Reject values the daemon cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_concurrent".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plan9_layout() {
        let config = PlumberConfig::default();
        assert_eq!(config.rules_file, PathBuf::from("/mnt/plumb/rules"));
        assert_eq!(config.plumb_file, PathBuf::from("/mnt/plumb/send"));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.framing, Framing::Blob);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_framing() {
        assert_eq!("blob".parse::<Framing>().unwrap(), Framing::Blob);
        assert_eq!(" Lines ".parse::<Framing>().unwrap(), Framing::Lines);
        assert!("json".parse::<Framing>().is_err());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let config = PlumberConfig {
            max_concurrent: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
