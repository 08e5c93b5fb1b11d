//! Orchestrator
//!
//! Resolves the manifest, then runs the requested pipeline against every
//! configured server:
//! 1. Load and resolve configuration (a failure here touches no server)
//! 2. Open one session per server
//! 3. Run setup or deploy over that session, then close it
//! 4. Collect every server's outcome into a [`RunSummary`]
//!
//! Servers are independent. With `parallel > 1` they are spread over a
//! bounded set of worker threads; a server's steps always stay on the
//! thread that started them.

mod options;
mod result;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::application::pipeline::{run_deploy, run_setup, StepRunner};
use crate::config::{load_manifest, ServerConfig};
use crate::domain::ports::{PipelineEvent, PipelineEventSink, PipelineKind, RemoteExecutor};
use crate::domain::services::ReleasePlanner;
use crate::error::ConfigResult;

pub use options::{RunOptions, DEFAULT_CONFIG_FILE_NAME, DEFAULT_DEPLOY_CONFIG_DIR};
pub use result::{ExitStatus, Outcome, RunSummary, ServerOutcome};

/// Label used when the session itself cannot be opened
pub const CONNECT_LABEL: &str = "Connect";

pub struct Orchestrator {
    executor: Arc<dyn RemoteExecutor>,
    planner: ReleasePlanner,
    events: Arc<dyn PipelineEventSink>,
    cancel: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(
        executor: Arc<dyn RemoteExecutor>,
        planner: ReleasePlanner,
        events: Arc<dyn PipelineEventSink>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            executor,
            planner,
            events,
            cancel,
        }
    }

    /// Resolve the manifest named by `options` and run every server.
    pub fn run(&self, options: &RunOptions) -> ConfigResult<RunSummary> {
        let path = options.manifest_path();
        let servers = load_manifest(&path)?;
        info!(
            manifest = %path.display(),
            servers = servers.len(),
            "resolved {} configuration",
            options.command
        );
        Ok(self.run_servers(options, &servers))
    }

    /// Run the pipeline against already-resolved servers.
    pub fn run_servers(&self, options: &RunOptions, servers: &[ServerConfig]) -> RunSummary {
        let started = Instant::now();
        let workers = options.parallel.clamp(1, servers.len().max(1));

        let outcomes = if workers == 1 {
            servers
                .iter()
                .map(|config| self.run_server(options, config))
                .collect()
        } else {
            self.run_parallel(options, servers, workers)
        };

        RunSummary {
            command: options.command,
            environment: options.environment.clone(),
            app: options.app.clone(),
            dry_run: options.mode.dry_run,
            elapsed: started.elapsed(),
            servers: outcomes,
        }
    }

    /// Workers pull server indices from a shared counter; outcomes come
    /// back in manifest order.
    fn run_parallel(
        &self,
        options: &RunOptions,
        servers: &[ServerConfig],
        workers: usize,
    ) -> Vec<ServerOutcome> {
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(config) = servers.get(index) else {
                        break;
                    };
                    let outcome = self.run_server(options, config);
                    if tx.send((index, outcome)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        let mut indexed: Vec<(usize, ServerOutcome)> = rx.into_iter().collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Run one server over its own session. The session is closed on every
    /// path once it was opened.
    fn run_server(&self, options: &RunOptions, config: &ServerConfig) -> ServerOutcome {
        let started = Instant::now();

        if self.cancel.load(Ordering::SeqCst) {
            return ServerOutcome::not_started(
                config,
                None,
                "cancelled before the server was contacted".to_string(),
                Duration::ZERO,
            );
        }

        let target = config.session_target();
        let mut session = match self.executor.open(&target) {
            Ok(session) => session,
            Err(err) => {
                let elapsed = started.elapsed();
                self.events.on_event(PipelineEvent::StepFailed {
                    host: config.host.clone(),
                    label: CONNECT_LABEL,
                    elapsed,
                    error: err.to_string(),
                });
                return ServerOutcome::not_started(
                    config,
                    Some(CONNECT_LABEL),
                    err.to_string(),
                    elapsed,
                );
            }
        };

        let run = {
            let mut runner = StepRunner::new(
                session.as_mut(),
                self.events.as_ref(),
                options.mode,
                &self.cancel,
            );
            match options.command {
                PipelineKind::Setup => run_setup(&mut runner, config),
                PipelineKind::Deploy => run_deploy(&mut runner, config, &self.planner),
            }
        };

        if let Err(err) = session.close() {
            warn!(host = %config.host, "failed to close session: {}", err);
        }

        ServerOutcome::from_run(config, run, started.elapsed())
    }
}
