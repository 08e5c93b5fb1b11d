//! Pystrano CLI - release-directory deployments of Python web applications
//!
//! Usage: pystrano <setup|deploy> <ENVIRONMENT> <APP> [OPTIONS]
//!
//! Exit codes:
//!   0  every server succeeded
//!   1  at least one server failed or was only partially deployed
//!   2  the manifest could not be resolved (no server was contacted)

mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;
use pystrano::presentation::Cli;
use pystrano::ExitStatus;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let status = commands::run::cmd_run(&cli)?;
    if status != ExitStatus::Success {
        std::process::exit(status.code());
    }
    Ok(())
}
