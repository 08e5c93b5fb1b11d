//! Output Rendering
//!
//! Progress goes to the log (stderr) as pipeline events arrive; the final
//! summary is rendered once, as text or as a JSON document on stdout.

use tracing::{debug, error, info};

use crate::application::{Outcome, RunSummary, ServerOutcome};
use crate::domain::ports::{PipelineEvent, PipelineEventSink};

/// Event sink that reports pipeline progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl PipelineEventSink for LogEventSink {
    fn on_event(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::ServerStarted {
                host,
                kind,
                step_count,
            } => {
                info!(host = %host, "{} started ({} steps)", kind, step_count);
            }
            PipelineEvent::ReleasePlanned {
                host,
                release_id,
                first_release,
                prune,
            } => {
                if first_release {
                    info!(host = %host, release = %release_id, "first release");
                } else {
                    info!(
                        host = %host,
                        release = %release_id,
                        prune = prune.len(),
                        "new release"
                    );
                }
            }
            PipelineEvent::StepStarted { host, index, label } => {
                info!(host = %host, "{}. {}", index + 1, label);
            }
            PipelineEvent::ActionIssued {
                host,
                description,
                dry_run,
            } => {
                if dry_run {
                    info!(host = %host, "[dry-run] {}", description);
                } else {
                    debug!(host = %host, "{}", description);
                }
            }
            PipelineEvent::OutputLine { host, line } => {
                info!(host = %host, "  {}", line);
            }
            PipelineEvent::StepFinished {
                host,
                label,
                elapsed,
            } => {
                debug!(host = %host, elapsed = ?elapsed, "{} finished", label);
            }
            PipelineEvent::StepFailed {
                host,
                label,
                elapsed,
                error,
            } => {
                error!(host = %host, elapsed = ?elapsed, "{} failed: {}", label, error);
            }
        }
    }
}

/// Serialize the summary as pretty-printed JSON.
pub fn render_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

/// One line describing a server's result, e.g.
/// `web1.example.com  failed at Fetch source (3.2s)`.
pub fn describe_server(server: &ServerOutcome) -> String {
    let elapsed = format!("{:.1}s", server.elapsed.as_secs_f64());
    match (server.outcome, server.failed_step) {
        (Outcome::Succeeded, _) => match &server.release_id {
            Some(release) => format!("{}  release {} ({})", server.host, release, elapsed),
            None => format!("{}  {} steps ({})", server.host, server.step_count, elapsed),
        },
        (Outcome::Partial, Some(step)) => {
            format!("{}  live, but {} failed ({})", server.host, step, elapsed)
        }
        (_, Some(step)) => format!("{}  failed at {} ({})", server.host, step, elapsed),
        (_, None) => format!("{}  {} ({})", server.host, server.outcome.as_str(), elapsed),
    }
}
