//! Remote Executor Port
//!
//! The only way the pipeline talks to a server. A session is bound to one
//! `user@host:port` and carries one command stream at a time, so it is
//! `&mut` throughout and never shared between servers.

use crate::error::{ExecutionError, TransferError};
use std::fmt;
use std::path::Path;

/// Who and where a session connects to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
}

impl SessionTarget {
    pub fn new(host: impl Into<String>, port: u16, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
        }
    }

    /// `user@host`, the form ssh and scp expect
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

impl fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Captured result of one remote command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Exit code 0 with no output
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// An open, exclusive connection to one server.
pub trait RemoteSession: Send {
    /// Where this session is connected
    fn target(&self) -> &SessionTarget;

    /// Run a shell command line. A non-zero exit is returned as output,
    /// not as an error; errors mean the command could not be run at all.
    fn run_command(&mut self, command: &str) -> Result<CommandOutput, ExecutionError>;

    /// Run a command and hand each output line to `on_line` as it arrives.
    ///
    /// The default implementation waits for the command to finish and
    /// replays its output.
    fn run_command_streaming(
        &mut self,
        command: &str,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<CommandOutput, ExecutionError> {
        let output = self.run_command(command)?;
        for line in output.stdout.lines().chain(output.stderr.lines()) {
            on_line(line);
        }
        Ok(output)
    }

    /// Copy a local file to `remote_path`, overwriting it
    fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), TransferError>;

    /// Entry names directly under `remote_path`, sorted; empty when the
    /// directory does not exist
    fn list_directory(&mut self, remote_path: &str) -> Result<Vec<String>, ExecutionError>;

    /// Tear the connection down. Safe to call more than once.
    fn close(&mut self) -> Result<(), ExecutionError>;
}

/// Opens sessions. Implementations must be shareable across worker threads.
pub trait RemoteExecutor: Send + Sync {
    fn open(&self, target: &SessionTarget) -> Result<Box<dyn RemoteSession>, ExecutionError>;
}
