//! Step execution against one remote session

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::ports::{CommandOutput, PipelineEvent, PipelineEventSink, RemoteSession};
use crate::domain::value_objects::ExecutionMode;
use crate::error::{ExecutionError, PipelineError, StepFailure, TransferError};

use super::{PipelineRun, PipelineStep, RemoteAction};

/// Drives steps for a single server over its exclusive session.
///
/// Steps run strictly in order; nothing here is shared with other servers.
pub struct StepRunner<'a> {
    session: &'a mut dyn RemoteSession,
    events: &'a dyn PipelineEventSink,
    mode: ExecutionMode,
    cancel: &'a AtomicBool,
    host: String,
}

impl<'a> StepRunner<'a> {
    pub fn new(
        session: &'a mut dyn RemoteSession,
        events: &'a dyn PipelineEventSink,
        mode: ExecutionMode,
        cancel: &'a AtomicBool,
    ) -> Self {
        let host = session.target().host.clone();
        Self {
            session,
            events,
            mode,
            cancel,
            host,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn emit(&self, event: PipelineEvent) {
        self.events.on_event(event);
    }

    /// Run `steps` in order, recording progress in `run`. Stops at the first
    /// fatal failure.
    pub fn run_steps<C>(&mut self, steps: &[PipelineStep<C>], ctx: &C, run: &mut PipelineRun) {
        for (index, step) in steps.iter().enumerate() {
            match self.run_step(index, step, ctx) {
                Ok(()) => {
                    run.steps_completed += 1;
                    if step.point_of_no_return {
                        run.committed = true;
                    }
                }
                Err(err) if step.fatal || matches!(err.cause, StepFailure::Cancelled) => {
                    run.error = Some(err);
                    return;
                }
                Err(err) => {
                    warn!(host = %self.host, "continuing after non-fatal failure: {}", err);
                    run.steps_completed += 1;
                }
            }
        }
    }

    /// Run one step. Refuses to start once cancellation was requested.
    pub fn run_step<C>(
        &mut self,
        index: usize,
        step: &PipelineStep<C>,
        ctx: &C,
    ) -> Result<(), PipelineError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(self.fail(step.label, Duration::ZERO, StepFailure::Cancelled));
        }

        self.emit(PipelineEvent::StepStarted {
            host: self.host.clone(),
            index,
            label: step.label,
        });

        let started = Instant::now();
        let actions = step.actions(ctx);
        let result = self.perform_all(&actions);
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                self.emit(PipelineEvent::StepFinished {
                    host: self.host.clone(),
                    label: step.label,
                    elapsed,
                });
                Ok(())
            }
            Err(cause) => Err(self.fail(step.label, elapsed, cause)),
        }
    }

    /// Run a command line; non-zero exit is an error. In verbose mode each
    /// output line is forwarded as it arrives.
    pub fn run_command(&mut self, command: &str) -> Result<CommandOutput, ExecutionError> {
        let output = if self.mode.verbose {
            let host = self.host.clone();
            let events = self.events;
            self.session.run_command_streaming(command, &mut |line| {
                events.on_event(PipelineEvent::OutputLine {
                    host: host.clone(),
                    line: line.to_string(),
                })
            })?
        } else {
            self.session.run_command(command)?
        };

        if !output.success() {
            return Err(ExecutionError::NonZeroExit {
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    /// Read-only listing, executed even in dry-run.
    pub fn list_directory(&mut self, path: &str) -> Result<Vec<String>, ExecutionError> {
        debug!(host = %self.host, path, "listing remote directory");
        self.session.list_directory(path)
    }

    /// Run a cleanup command whose failure is only worth a warning.
    pub fn best_effort(&mut self, command: &str) {
        self.emit(PipelineEvent::ActionIssued {
            host: self.host.clone(),
            description: format!("run: {}", command),
            dry_run: self.mode.dry_run,
        });
        if let Err(err) = self.run_command(command) {
            warn!(host = %self.host, "cleanup failed: {}", err);
        }
    }

    fn perform_all(&mut self, actions: &[RemoteAction]) -> Result<(), StepFailure> {
        for action in actions {
            self.perform(action)?;
        }
        Ok(())
    }

    fn perform(&mut self, action: &RemoteAction) -> Result<(), StepFailure> {
        self.emit(PipelineEvent::ActionIssued {
            host: self.host.clone(),
            description: action.to_string(),
            dry_run: self.mode.dry_run,
        });

        match action {
            RemoteAction::Run { command } => {
                self.run_command(command)?;
            }
            RemoteAction::Upload { local, remote } => {
                self.session.upload_file(local, remote)?;
            }
            RemoteAction::UploadContent { content, remote } => {
                let file = materialize(content)?;
                self.session.upload_file(file.path(), remote)?;
            }
        }
        Ok(())
    }

    fn fail(&self, step: &'static str, elapsed: Duration, cause: StepFailure) -> PipelineError {
        let err = PipelineError {
            step,
            host: self.host.clone(),
            elapsed,
            cause,
        };
        self.emit(PipelineEvent::StepFailed {
            host: self.host.clone(),
            label: step,
            elapsed,
            error: err.cause.to_string(),
        });
        err
    }
}

/// Write generated content to a local temp file for upload.
fn materialize(content: &str) -> Result<NamedTempFile, TransferError> {
    let mut file = NamedTempFile::new().map_err(|e| TransferError::LocalFile {
        path: std::env::temp_dir(),
        message: e.to_string(),
    })?;

    if let Err(e) = file.write_all(content.as_bytes()).and_then(|()| file.flush()) {
        return Err(TransferError::LocalFile {
            path: file.path().to_path_buf(),
            message: e.to_string(),
        });
    }
    Ok(file)
}
