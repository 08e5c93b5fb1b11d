//! Orchestrator Factory
//!
//! Wires the orchestrator to its infrastructure. This is the dependency
//! injection point for the binary.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::application::Orchestrator;
use crate::domain::ports::{PipelineEventSink, RemoteExecutor};
use crate::domain::services::ReleasePlanner;
use crate::infrastructure::{DryRunExecutor, SshExecutor, SystemClock};

/// Select the remote executor for a run.
///
/// Dry runs still open real sessions (release listings are read-only and
/// feed the plan); every mutating call is swallowed by the wrapper.
pub fn create_executor(dry_run: bool) -> Arc<dyn RemoteExecutor> {
    let ssh: Arc<dyn RemoteExecutor> = Arc::new(SshExecutor::from_env());
    if dry_run {
        Arc::new(DryRunExecutor::new(ssh))
    } else {
        ssh
    }
}

/// Create an orchestrator backed by OpenSSH and the system clock.
pub fn create_orchestrator(
    dry_run: bool,
    events: Arc<dyn PipelineEventSink>,
    cancel: Arc<AtomicBool>,
) -> Orchestrator {
    Orchestrator::new(
        create_executor(dry_run),
        ReleasePlanner::new(Arc::new(SystemClock)),
        events,
        cancel,
    )
}
