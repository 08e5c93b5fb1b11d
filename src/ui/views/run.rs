use std::path::Path;

use pystrano::presentation::describe_server;
use pystrano::{Outcome, PipelineKind, RunOptions, RunSummary};

use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::summary::{ResultSummary, SummaryTone};
use crate::ui::primitives::icon::Icon;

fn title_case(kind: PipelineKind) -> &'static str {
    match kind {
        PipelineKind::Setup => "Setup",
        PipelineKind::Deploy => "Deploy",
    }
}

fn command_icon(kind: PipelineKind) -> Icon {
    match kind {
        PipelineKind::Setup => Icon::Setup,
        PipelineKind::Deploy => Icon::Deploy,
    }
}

pub fn render_run_header(
    options: &RunOptions,
    manifest: &Path,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(
        command_icon(options.command),
        format!("Pystrano {}", title_case(options.command)),
    );
    header.add("App", options.app.as_str());
    header.add("Environment", options.environment.as_str());
    header.add("Manifest", manifest.display().to_string());
    if options.mode.dry_run {
        header.add("Mode", "dry run (no changes will be made)");
    }
    if options.parallel > 1 {
        header.add("Parallel", options.parallel.to_string());
    }

    header.render(supports_color, supports_unicode)
}

pub fn render_run_summary(
    summary: &RunSummary,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let action = title_case(summary.command);
    let succeeded = summary.count(Outcome::Succeeded);
    let partial = summary.count(Outcome::Partial);
    let failed = summary.count(Outcome::Failed);

    let (title, tone) = if summary.is_success() {
        let title = if summary.dry_run {
            format!("{action} Dry Run Complete")
        } else {
            format!("{action} Complete")
        };
        (title, SummaryTone::Success)
    } else if failed == 0 {
        (format!("{action} Partially Complete"), SummaryTone::Partial)
    } else if succeeded + partial == 0 {
        (format!("{action} Failed"), SummaryTone::Failure)
    } else {
        (format!("{action} Results"), SummaryTone::Partial)
    };

    let mut block = ResultSummary::new(title, tone);
    block.add_stat("succeeded", succeeded);
    if partial > 0 {
        block.add_stat("partial", partial);
    }
    if failed > 0 {
        block.add_stat("failed", failed);
    }

    for server in &summary.servers {
        let icon = match server.outcome {
            Outcome::Succeeded => Icon::Success,
            Outcome::Partial => Icon::Warning,
            Outcome::Failed => Icon::Error,
        };
        block.add_item(icon, describe_server(server));
    }

    for server in summary.servers.iter().filter(|s| !s.is_success()) {
        if let Some(error) = &server.error {
            block.add_note(format!("{}: {}", server.host, error));
        }
    }

    if failed > 0 {
        block.with_next_step(format!(
            "fix the errors above, then re-run `pystrano {} {} {}`",
            summary.command, summary.environment, summary.app
        ));
    } else if partial > 0 {
        block.with_next_step("the new release is live; check the service on the partial servers");
    }

    block.render(supports_color, supports_unicode)
}
