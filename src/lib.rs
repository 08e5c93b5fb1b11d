//! Pystrano - release-directory deployments of Python web applications
//!
//! Reads a per-app, per-environment YAML manifest and, over SSH, either
//! provisions the listed servers (`setup`) or builds and activates a new
//! timestamped release on each of them (`deploy`). The live release is a
//! `current` symlink that is swapped atomically; old releases are pruned.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod presentation;
pub mod shell;

// Re-exports for convenience
pub use application::{ExitStatus, Orchestrator, Outcome, RunOptions, RunSummary};
pub use config::{load_manifest, resolve, ServerConfig};
pub use domain::ports::PipelineKind;
pub use error::{ConfigError, ExecutionError, PipelineError, TransferError};
