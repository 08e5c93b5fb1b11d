//! OpenSSH-backed Remote Executor
//!
//! Each session starts one ControlMaster connection (`ssh -M -fN`) and runs
//! every command and copy through its socket, so authentication happens
//! once per server. The master is shut down with `-O exit` on close.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::domain::ports::{CommandOutput, RemoteExecutor, RemoteSession, SessionTarget};
use crate::error::{ExecutionError, TransferError};
use crate::shell::quote;

/// Environment variable selecting the ssh program
pub const SSH_PROGRAM_ENV: &str = "PYSTRANO_SSH";
/// Environment variable selecting the scp program
pub const SCP_PROGRAM_ENV: &str = "PYSTRANO_SCP";

/// ssh's own failures (as opposed to the remote command's) exit with 255
const SSH_ERROR_EXIT: i32 = 255;

/// Opens ControlMaster sessions with the system `ssh` and `scp`.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    ssh_program: String,
    scp_program: String,
}

impl SshExecutor {
    pub fn new(ssh_program: impl Into<String>, scp_program: impl Into<String>) -> Self {
        Self {
            ssh_program: ssh_program.into(),
            scp_program: scp_program.into(),
        }
    }

    /// `ssh`/`scp`, unless overridden by `PYSTRANO_SSH`/`PYSTRANO_SCP`.
    pub fn from_env() -> Self {
        let program = |var: &str, default: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self::new(program(SSH_PROGRAM_ENV, "ssh"), program(SCP_PROGRAM_ENV, "scp"))
    }
}

impl Default for SshExecutor {
    fn default() -> Self {
        Self::new("ssh", "scp")
    }
}

impl RemoteExecutor for SshExecutor {
    fn open(&self, target: &SessionTarget) -> Result<Box<dyn RemoteSession>, ExecutionError> {
        let destination = target.destination();
        let connection_error = |message: String| ExecutionError::Connection {
            destination: destination.clone(),
            message,
        };

        let control_dir = tempfile::Builder::new()
            .prefix("pystrano-")
            .tempdir()
            .map_err(|e| connection_error(format!("cannot create control directory: {}", e)))?;
        let socket = control_dir.path().join("control.sock");

        // With -f the master keeps stderr open after forking, so it goes to a
        // file rather than a pipe that would never reach EOF.
        let mut stderr_file = tempfile::tempfile()
            .map_err(|e| connection_error(format!("cannot create log file: {}", e)))?;
        let stderr_handle = stderr_file
            .try_clone()
            .map_err(|e| connection_error(e.to_string()))?;

        debug!(session = %target, "opening control master");
        let status = Command::new(&self.ssh_program)
            .arg("-M")
            .arg("-S")
            .arg(&socket)
            .arg("-fN")
            .args(["-o", "BatchMode=yes", "-o", "ControlPersist=yes"])
            .arg("-p")
            .arg(target.port.to_string())
            .arg(&destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_handle))
            .status()
            .map_err(|e| spawn_error(&self.ssh_program, e))?;

        if !status.success() {
            return Err(connection_error(read_all(&mut stderr_file)));
        }

        Ok(Box::new(SshSession {
            target: target.clone(),
            ssh_program: self.ssh_program.clone(),
            scp_program: self.scp_program.clone(),
            socket,
            control_dir: Some(control_dir),
        }))
    }
}

/// One ControlMaster connection. Closed on drop.
pub struct SshSession {
    target: SessionTarget,
    ssh_program: String,
    scp_program: String,
    socket: PathBuf,
    control_dir: Option<TempDir>,
}

impl SshSession {
    fn ssh(&self) -> Command {
        let mut cmd = Command::new(&self.ssh_program);
        cmd.arg("-S")
            .arg(&self.socket)
            .args(["-o", "BatchMode=yes"])
            .arg("-p")
            .arg(self.target.port.to_string())
            .arg(self.target.destination());
        cmd
    }

    fn ensure_open(&self) -> Result<(), ExecutionError> {
        if self.control_dir.is_none() {
            return Err(ExecutionError::Connection {
                destination: self.target.destination(),
                message: "session already closed".to_string(),
            });
        }
        Ok(())
    }

    fn to_output(&self, output: Output) -> Result<CommandOutput, ExecutionError> {
        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if exit_code == SSH_ERROR_EXIT {
            return Err(ExecutionError::Connection {
                destination: self.target.destination(),
                message: stderr.trim().to_string(),
            });
        }
        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
        })
    }
}

impl RemoteSession for SshSession {
    fn target(&self) -> &SessionTarget {
        &self.target
    }

    fn run_command(&mut self, command: &str) -> Result<CommandOutput, ExecutionError> {
        self.ensure_open()?;
        debug!(host = %self.target.host, command, "ssh");
        let output = self
            .ssh()
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&self.ssh_program, e))?;
        self.to_output(output)
    }

    fn run_command_streaming(
        &mut self,
        command: &str,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<CommandOutput, ExecutionError> {
        self.ensure_open()?;
        debug!(host = %self.target.host, command, "ssh (streaming)");
        let mut child = self
            .ssh()
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&self.ssh_program, e))?;

        let (tx, rx) = mpsc::channel::<(bool, String)>();
        let mut stdout = String::new();
        let mut stderr = String::new();

        std::thread::scope(|scope| {
            if let Some(out) = child.stdout.take() {
                let tx = tx.clone();
                scope.spawn(move || forward_lines(out, false, tx));
            }
            if let Some(err) = child.stderr.take() {
                let tx = tx.clone();
                scope.spawn(move || forward_lines(err, true, tx));
            }
            drop(tx);

            for (is_stderr, line) in rx {
                on_line(&line);
                let buffer = if is_stderr { &mut stderr } else { &mut stdout };
                buffer.push_str(&line);
                buffer.push('\n');
            }
        });

        let status = child
            .wait()
            .map_err(|e| spawn_error(&self.ssh_program, e))?;

        self.to_output(Output {
            status,
            stdout: stdout.into_bytes(),
            stderr: stderr.into_bytes(),
        })
    }

    fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), TransferError> {
        let copy_error = |message: String| TransferError::Copy {
            local: local_path.to_path_buf(),
            remote: remote_path.to_string(),
            message,
        };

        File::open(local_path).map_err(|e| TransferError::LocalFile {
            path: local_path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.ensure_open().map_err(|e| copy_error(e.to_string()))?;

        debug!(host = %self.target.host, local = %local_path.display(), remote_path, "scp");
        let output = Command::new(&self.scp_program)
            .arg("-q")
            .arg("-o")
            .arg(format!("ControlPath={}", self.socket.display()))
            .args(["-o", "BatchMode=yes"])
            .arg("-P")
            .arg(self.target.port.to_string())
            .arg(local_path)
            .arg(format!("{}:{}", self.target.destination(), remote_path))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| copy_error(format!("failed to spawn {}: {}", self.scp_program, e)))?;

        if !output.status.success() {
            return Err(copy_error(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    fn list_directory(&mut self, remote_path: &str) -> Result<Vec<String>, ExecutionError> {
        let path = quote(remote_path);
        let command = format!("if [ -d {0} ]; then ls -1A {0}; fi", path);
        let output = self.run_command(&command)?;
        if !output.success() {
            return Err(ExecutionError::NonZeroExit {
                command,
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        let mut entries: Vec<String> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        entries.sort();
        Ok(entries)
    }

    fn close(&mut self) -> Result<(), ExecutionError> {
        let Some(control_dir) = self.control_dir.take() else {
            return Ok(());
        };

        debug!(host = %self.target.host, "closing control master");
        let result = Command::new(&self.ssh_program)
            .arg("-S")
            .arg(&self.socket)
            .args(["-O", "exit"])
            .arg(self.target.destination())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        drop(control_dir);

        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(spawn_error(&self.ssh_program, e)),
        }
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(host = %self.target.host, "failed to close ssh session: {}", err);
        }
    }
}

/// Forward every line until EOF. Bytes that are not UTF-8 are replaced
/// rather than ending the read, so the pipe is always drained.
fn forward_lines(reader: impl Read, is_stderr: bool, tx: mpsc::Sender<(bool, String)>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        // Keep draining even if the receiver is gone.
        let _ = tx.send((is_stderr, line));
    }
}

fn read_all(file: &mut File) -> String {
    let mut text = String::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.read_to_string(&mut text);
    }
    let text = text.trim();
    if text.is_empty() {
        "ssh exited without a message".to_string()
    } else {
        text.to_string()
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> ExecutionError {
    ExecutionError::Spawn {
        program: program.to_string(),
        message: err.to_string(),
    }
}
