//! CLI Argument Parsing
//!
//! `pystrano <setup|deploy> <environment> <app> [options]`
//!
//! The manifest is read from
//! `<deploy-config-dir>/<app>/<environment>/<config-file-name>`.

use std::path::PathBuf;

use clap::Parser;

use crate::application::{RunOptions, DEFAULT_CONFIG_FILE_NAME, DEFAULT_DEPLOY_CONFIG_DIR};
use crate::domain::ports::PipelineKind;
use crate::domain::value_objects::ExecutionMode;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// Pystrano - release-directory deployments of Python web applications over SSH
#[derive(Parser, Debug)]
#[command(name = "pystrano")]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "Examples:\n  pystrano setup production shop\n  pystrano deploy staging shop --dry-run"
)]
pub struct Cli {
    /// Pipeline to run
    #[arg(value_enum)]
    pub command: PipelineKind,

    /// Environment name (directory under the app's config directory)
    pub environment: String,

    /// Application name (directory under the deploy config directory)
    pub app: String,

    /// Root directory holding <app>/<environment>/ manifests
    #[arg(long, default_value = DEFAULT_DEPLOY_CONFIG_DIR)]
    pub deploy_config_dir: PathBuf,

    /// Manifest file name inside the environment directory
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub config_file_name: String,

    /// Stream remote output and log every command
    #[arg(short, long)]
    pub verbose: bool,

    /// Log what would run without changing any server
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Number of servers processed at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub parallel: u16,

    /// Color output mode
    #[arg(long, value_enum)]
    pub color: Option<ColorWhen>,
}

impl Cli {
    pub fn mode(&self) -> ExecutionMode {
        ExecutionMode::new(self.dry_run, self.verbose)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions::new(self.command, &self.environment, &self.app)
            .with_deploy_config_dir(self.deploy_config_dir.clone())
            .with_config_file_name(&self.config_file_name)
            .with_mode(self.mode())
            .with_parallel(usize::from(self.parallel))
    }
}
