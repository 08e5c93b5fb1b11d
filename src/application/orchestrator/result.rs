//! Run Result
//!
//! Per-server outcomes and the overall exit status.

use std::time::Duration;

use serde::Serialize;

use crate::application::pipeline::PipelineRun;
use crate::config::ServerConfig;
use crate::domain::ports::PipelineKind;

/// How one server's pipeline ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    /// Failed before the new release went live; the old one still serves
    Failed,
    /// New release is live but restart or pruning failed
    Partial,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Failed => "failed",
            Outcome::Partial => "partial",
        }
    }
}

/// Result for a single server
#[derive(Debug, Clone, Serialize)]
pub struct ServerOutcome {
    pub host: String,
    pub port: u16,
    pub outcome: Outcome,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub steps_completed: usize,
    pub step_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerOutcome {
    pub(crate) fn from_run(config: &ServerConfig, run: PipelineRun, elapsed: Duration) -> Self {
        let outcome = match (&run.error, run.committed) {
            (None, _) => Outcome::Succeeded,
            (Some(_), true) => Outcome::Partial,
            (Some(_), false) => Outcome::Failed,
        };
        Self {
            host: config.host.clone(),
            port: config.port,
            outcome,
            elapsed,
            steps_completed: run.steps_completed,
            step_count: run.step_count,
            release_id: run.release.map(|r| r.release_id.to_string()),
            failed_step: run.error.as_ref().map(|e| e.step),
            error: run.error.map(|e| e.cause.to_string()),
        }
    }

    /// The server never ran a step.
    pub(crate) fn not_started(
        config: &ServerConfig,
        failed_step: Option<&'static str>,
        error: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            outcome: Outcome::Failed,
            elapsed,
            steps_completed: 0,
            step_count: 0,
            release_id: None,
            failed_step,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub command: PipelineKind,
    pub environment: String,
    pub app: String,
    pub dry_run: bool,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub servers: Vec<ServerOutcome>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.servers.iter().all(ServerOutcome::is_success)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.servers.iter().filter(|s| s.outcome == outcome).count()
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.is_success() {
            ExitStatus::Success
        } else {
            ExitStatus::ServerFailure
        }
    }
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// At least one server failed or only partially succeeded
    ServerFailure,
    /// Nothing ran: the manifest could not be resolved
    ConfigError,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::ServerFailure => 1,
            ExitStatus::ConfigError => 2,
        }
    }
}

fn as_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((duration.as_secs_f64() * 1000.0).round() / 1000.0)
}
