//! Task pipelines
//!
//! A pipeline is data: an ordered list of [`PipelineStep`]s, each turning
//! its context into the [`RemoteAction`]s it needs. The [`StepRunner`]
//! executes those actions against one session. Dry-run works by handing
//! the runner a session that swallows mutations, so step lists and logs
//! are identical in both modes.

mod deploy;
mod runner;
mod setup;

use std::fmt;
use std::path::PathBuf;

use crate::config::ServerConfig;
use crate::domain::services::ReleaseDecision;
use crate::domain::value_objects::{ExecutionMode, ReleaseId};
use crate::error::PipelineError;

pub use deploy::{deploy_steps, run_deploy};
pub use runner::StepRunner;
pub use setup::{run_setup, setup_steps};

/// A single remote operation issued by a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAction {
    /// Run a shell command line; non-zero exit fails the step
    Run { command: String },
    /// Copy a local file to the server
    Upload { local: PathBuf, remote: String },
    /// Write generated content to a file on the server
    UploadContent { content: String, remote: String },
}

impl RemoteAction {
    pub fn run(command: impl Into<String>) -> Self {
        RemoteAction::Run {
            command: command.into(),
        }
    }

    pub fn upload(local: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        RemoteAction::Upload {
            local: local.into(),
            remote: remote.into(),
        }
    }
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteAction::Run { command } => write!(f, "run: {}", command),
            RemoteAction::Upload { local, remote } => {
                write!(f, "upload: {} -> {}", local.display(), remote)
            }
            RemoteAction::UploadContent { content, remote } => {
                write!(f, "write: {} bytes -> {}", content.len(), remote)
            }
        }
    }
}

/// A named, ordered unit of work
pub struct PipelineStep<C> {
    /// Human-readable label used in logs and errors
    pub label: &'static str,
    /// Whether a failure stops the pipeline. Every current step is fatal.
    pub fatal: bool,
    /// Once this step succeeds the new release is live
    pub point_of_no_return: bool,
    pub build: fn(&C) -> Vec<RemoteAction>,
}

impl<C> PipelineStep<C> {
    pub const fn fatal(label: &'static str, build: fn(&C) -> Vec<RemoteAction>) -> Self {
        Self {
            label,
            fatal: true,
            point_of_no_return: false,
            build,
        }
    }

    pub const fn commits(mut self) -> Self {
        self.point_of_no_return = true;
        self
    }

    pub fn actions(&self, ctx: &C) -> Vec<RemoteAction> {
        (self.build)(ctx)
    }
}

impl<C> fmt::Debug for PipelineStep<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStep")
            .field("label", &self.label)
            .field("fatal", &self.fatal)
            .field("point_of_no_return", &self.point_of_no_return)
            .finish()
    }
}

/// Inputs for the setup steps
pub struct SetupContext<'a> {
    pub config: &'a ServerConfig,
    pub mode: ExecutionMode,
}

/// Inputs for the deploy steps
pub struct DeployContext<'a> {
    pub config: &'a ServerConfig,
    pub release: &'a ReleaseDecision,
    pub mode: ExecutionMode,
}

impl DeployContext<'_> {
    pub fn release_id(&self) -> &ReleaseId {
        &self.release.release_id
    }

    pub fn release_dir(&self) -> String {
        self.config.release_dir(&self.release.release_id)
    }
}

/// What happened when a pipeline ran against one server
#[derive(Debug)]
pub struct PipelineRun {
    pub step_count: usize,
    pub steps_completed: usize,
    /// Set for deploys once planning succeeded
    pub release: Option<ReleaseDecision>,
    /// True once the point-of-no-return step succeeded
    pub committed: bool,
    /// First fatal failure, if any
    pub error: Option<PipelineError>,
}

impl PipelineRun {
    pub(crate) fn new(step_count: usize) -> Self {
        Self {
            step_count,
            steps_completed: 0,
            release: None,
            committed: false,
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}
