//! Error types for pystrano
//!
//! Library errors use `thiserror`; only the binary reaches for `anyhow`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for configuration resolution
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where in the manifest a key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLocation {
    /// The top level of the manifest (next to `common` and `servers`)
    TopLevel,
    /// The `common` section, inherited by every server
    Common,
    /// The merged mapping for `servers[index]`
    Server(usize),
}

impl std::fmt::Display for KeyLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyLocation::TopLevel => write!(f, "top level"),
            KeyLocation::Common => write!(f, "common"),
            KeyLocation::Server(index) => write!(f, "servers[{}]", index),
        }
    }
}

/// Configuration failures. Always fatal and always raised before any
/// server is contacted.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Manifest file does not exist
    #[error("deployment config not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// IO error while reading the manifest
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest is not valid YAML
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A mandatory top-level section is absent
    #[error("missing required section '{section}'")]
    MissingSection { section: &'static str },

    /// `servers` is absent or has no entries
    #[error("'servers' must list at least one server")]
    EmptyServers,

    /// Key outside the documented schema
    #[error("unknown key '{key}' at {location}{}", suggestion_suffix(.suggestion))]
    UnknownKey {
        key: String,
        location: KeyLocation,
        suggestion: Option<String>,
    },

    /// Required key absent or empty after merging
    #[error("missing required key '{key}' for servers[{server_index}]")]
    MissingRequired { key: &'static str, server_index: usize },

    /// Value has the wrong YAML type or is out of range
    #[error("invalid value for '{key}' at {location}: expected {expected}")]
    InvalidType {
        key: String,
        location: KeyLocation,
        expected: &'static str,
    },

    /// `env_file` points at a file that does not exist
    #[error("env file not found: {path} (servers[{server_index}])")]
    EnvFileNotFound { path: PathBuf, server_index: usize },

    /// `env_file` has a line that is not `KEY=VALUE`
    #[error("invalid env file {path}:{line}: {message}")]
    InvalidEnvFile {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

/// Failure raised by the Remote Executor while running a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Could not open or keep a session to the host
    #[error("connection to {destination} failed: {message}")]
    Connection {
        destination: String,
        message: String,
    },

    /// Command ran and exited non-zero
    #[error("command exited with status {exit_code}: {command}{}", stderr_suffix(.stderr))]
    NonZeroExit {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Local process could not be spawned or waited on
    #[error("failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}

/// Failure raised by the Remote Executor while copying a file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Local source file is missing or unreadable
    #[error("local file {path} is not readable: {message}")]
    LocalFile { path: PathBuf, message: String },

    /// Copy command failed
    #[error("copy of {local} to {remote} failed: {message}")]
    Copy {
        local: PathBuf,
        remote: String,
        message: String,
    },
}

/// Why a single step failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepFailure {
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Abort requested before the step started
    #[error("cancelled before the step started")]
    Cancelled,
}

/// First failing step for one server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("step '{step}' failed on {host} after {:.1}s: {cause}", .elapsed.as_secs_f64())]
pub struct PipelineError {
    /// Human-readable label of the failed step
    pub step: &'static str,
    /// Server the step ran against
    pub host: String,
    /// Time spent in the failing step
    pub elapsed: Duration,
    /// Underlying failure
    pub cause: StepFailure,
}
