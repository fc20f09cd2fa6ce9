//! Error types for the plumber.

use std::path::PathBuf;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Cannot open log file {path}: {source}")]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install logger: {0}")]
    Logging(String),
}

/// Inbound channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Cannot open inbound channel {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read inbound channel: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Envelope encoding and decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Invalid message envelope: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Inconsistent attribute: {0}")]
    InvalidAttribute(String),
}

/// Variable expansion errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    #[error("expected closing quote")]
    UnterminatedQuote,

    #[error("unterminated variable reference, expected '}}'")]
    UnterminatedBrace,

    #[error("empty variable name in '${{}}'")]
    EmptyName,

    #[error("invalid character {0:?} in variable name")]
    InvalidNameChar(char),
}

/// Reasons a `name=value` line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("missing '='")]
    MissingEquals,

    #[error("missing variable name")]
    EmptyName,

    #[error("invalid character {bad:?} in variable name {name:?}")]
    InvalidNameChar { name: String, bad: char },

    #[error("variable name {0:?} starts with a digit")]
    LeadingDigit(String),
}

/// Rule file errors. Syntax errors only invalidate the current rule group.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Cannot read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: inconsistent pattern: {text}")]
    Pattern { line: usize, text: String },

    #[error("line {line}: invalid variable declaration: {source}")]
    Assignment {
        line: usize,
        #[source]
        source: AssignmentError,
    },

    #[error("line {line}: {source}")]
    Expand {
        line: usize,
        #[source]
        source: ExpandError,
    },

    #[error("line {line}: malformed line: {text}")]
    Malformed { line: usize, text: String },
}

/// Errors raised while evaluating a single clause. Any of these makes the
/// clause false.
#[derive(Debug, thiserror::Error)]
pub enum ClauseError {
    #[error("expansion failed: {0}")]
    Expand(#[from] ExpandError),

    #[error("unknown object: {0}")]
    UnknownObject(String),

    #[error("inconsistent verb with object '{obj}': {verb}")]
    UnknownVerb { obj: String, verb: String },

    #[error("invalid regular expression {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Side-effect failures. These never change a clause's verdict.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Failed to start {command:?}: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to {path}: {source}")]
    AppendFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for the plumber.
pub type Result<T> = std::result::Result<T, Error>;
