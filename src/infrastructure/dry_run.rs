//! Dry-run Remote Executor
//!
//! Wraps a real executor. Sessions really connect and forward read-only
//! listings so planning sees the server's actual state; commands and
//! uploads are logged and reported as successful without being issued.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{CommandOutput, RemoteExecutor, RemoteSession, SessionTarget};
use crate::error::{ExecutionError, TransferError};

pub struct DryRunExecutor {
    inner: Arc<dyn RemoteExecutor>,
}

impl DryRunExecutor {
    pub fn new(inner: Arc<dyn RemoteExecutor>) -> Self {
        Self { inner }
    }
}

impl RemoteExecutor for DryRunExecutor {
    fn open(&self, target: &SessionTarget) -> Result<Box<dyn RemoteSession>, ExecutionError> {
        let inner = self.inner.open(target)?;
        Ok(Box::new(DryRunSession::new(inner)))
    }
}

/// Session that only lets read-only calls through.
pub struct DryRunSession {
    inner: Box<dyn RemoteSession>,
}

impl DryRunSession {
    pub fn new(inner: Box<dyn RemoteSession>) -> Self {
        Self { inner }
    }
}

impl RemoteSession for DryRunSession {
    fn target(&self) -> &SessionTarget {
        self.inner.target()
    }

    fn run_command(&mut self, command: &str) -> Result<CommandOutput, ExecutionError> {
        debug!(host = %self.target().host, command, "suppressed command");
        Ok(CommandOutput::ok())
    }

    fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), TransferError> {
        debug!(
            host = %self.target().host,
            local = %local_path.display(),
            remote_path,
            "suppressed upload"
        );
        Ok(())
    }

    fn list_directory(&mut self, remote_path: &str) -> Result<Vec<String>, ExecutionError> {
        self.inner.list_directory(remote_path)
    }

    fn close(&mut self) -> Result<(), ExecutionError> {
        self.inner.close()
    }
}
