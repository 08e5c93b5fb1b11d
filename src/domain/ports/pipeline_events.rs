//! Pipeline Event Port
//!
//! Provides an observable interface for setup and deploy runs.
//! Enables progress reporting, logging, and assertions in tests.

use serde::Serialize;
use std::time::Duration;

/// Which pipeline a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Provision servers (idempotent)
    Setup,
    /// Build and activate a new release
    Deploy,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Setup => "setup",
            PipelineKind::Deploy => "deploy",
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted while a pipeline runs against one server
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Session opened, pipeline about to start
    ServerStarted {
        host: String,
        kind: PipelineKind,
        step_count: usize,
    },

    /// Release chosen for a deploy
    ReleasePlanned {
        host: String,
        release_id: String,
        first_release: bool,
        prune: Vec<String>,
    },

    /// A step is starting
    StepStarted {
        host: String,
        index: usize,
        label: &'static str,
    },

    /// A remote action was issued (or, in dry-run, would have been)
    ActionIssued {
        host: String,
        description: String,
        dry_run: bool,
    },

    /// One line of raw remote output (verbose mode only)
    OutputLine { host: String, line: String },

    /// A step finished successfully
    StepFinished {
        host: String,
        label: &'static str,
        elapsed: Duration,
    },

    /// A step failed; no further steps run for this host
    StepFailed {
        host: String,
        label: &'static str,
        elapsed: Duration,
        error: String,
    },
}

/// Trait for receiving pipeline events
///
/// Implementations can be:
/// - LogEventSink: tracing output for the terminal
/// - NoopEventSink: Silent operation
/// - test sinks that record events
pub trait PipelineEventSink: Send + Sync {
    /// Handle a pipeline event
    fn on_event(&self, event: PipelineEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl PipelineEventSink for NoopEventSink {
    fn on_event(&self, _event: PipelineEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingEventSink {
        events: Arc<Mutex<Vec<PipelineEvent>>>,
    }

    impl PipelineEventSink for RecordingEventSink {
        fn on_event(&self, event: PipelineEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn recording_sink_captures_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingEventSink {
            events: events.clone(),
        };

        sink.on_event(PipelineEvent::StepStarted {
            host: "web1".to_string(),
            index: 0,
            label: "Create release directory",
        });
        sink.on_event(PipelineEvent::StepFinished {
            host: "web1".to_string(),
            label: "Create release directory",
            elapsed: Duration::from_millis(3),
        });

        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn pipeline_kind_names() {
        assert_eq!(PipelineKind::Setup.to_string(), "setup");
        assert_eq!(PipelineKind::Deploy.as_str(), "deploy");
    }
}
