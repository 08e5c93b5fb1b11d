//! `setup` / `deploy` entry point

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use pystrano::logging::{init_logging, LogOptions};
use pystrano::presentation::{factory, render_json, Cli, LogEventSink};
use pystrano::{ConfigError, ExitStatus};

use crate::ui::context::UiContext;
use crate::ui::views::run::{render_run_header, render_run_summary};

pub fn cmd_run(cli: &Cli) -> Result<ExitStatus> {
    let ui = UiContext::new(cli.json, cli.color);
    init_logging(LogOptions::new(cli.verbose, ui.log_color))
        .context("failed to initialise logging")?;

    // First Ctrl+C: finish the step in flight, then stop. Second: abort.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    ctrlc::set_handler(move || {
        if cancel_clone.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        eprintln!("Interrupted: stopping after the current step (Ctrl+C again to abort)");
    })
    .context("failed to install Ctrl+C handler")?;

    let options = cli.run_options();
    if ui.show_text() {
        print!(
            "{}",
            render_run_header(&options, &options.manifest_path(), ui.color, ui.unicode)
        );
        println!();
    }

    let orchestrator =
        factory::create_orchestrator(cli.dry_run, Arc::new(LogEventSink), cancel);

    let summary = match orchestrator.run(&options) {
        Ok(summary) => summary,
        Err(err) => {
            report_config_error(cli, &err)?;
            return Ok(ExitStatus::ConfigError);
        }
    };

    let mut stdout = std::io::stdout().lock();
    if ui.json {
        writeln!(stdout, "{}", render_json(&summary)?)?;
    } else {
        writeln!(stdout)?;
        write!(stdout, "{}", render_run_summary(&summary, ui.color, ui.unicode))?;
    }
    stdout.flush()?;

    Ok(summary.exit_status())
}

fn report_config_error(cli: &Cli, err: &ConfigError) -> Result<()> {
    eprintln!("Error: {}", err);
    if cli.json {
        let doc = serde_json::json!({
            "command": cli.command,
            "environment": cli.environment,
            "app": cli.app,
            "error": err.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }
    Ok(())
}
