//! Run Options
//!
//! Everything the orchestrator needs to know about one invocation.

use std::path::PathBuf;

use crate::config::manifest_path;
use crate::domain::ports::PipelineKind;
use crate::domain::value_objects::ExecutionMode;

pub const DEFAULT_DEPLOY_CONFIG_DIR: &str = "./deploy";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "deployment.yml";

/// Options for one `setup` or `deploy` run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub command: PipelineKind,
    pub environment: String,
    pub app: String,
    /// Root of the per-app, per-environment manifest tree
    pub deploy_config_dir: PathBuf,
    pub config_file_name: String,
    pub mode: ExecutionMode,
    /// Servers processed at once (at least 1)
    pub parallel: usize,
}

impl RunOptions {
    pub fn new(
        command: PipelineKind,
        environment: impl Into<String>,
        app: impl Into<String>,
    ) -> Self {
        Self {
            command,
            environment: environment.into(),
            app: app.into(),
            deploy_config_dir: PathBuf::from(DEFAULT_DEPLOY_CONFIG_DIR),
            config_file_name: DEFAULT_CONFIG_FILE_NAME.to_string(),
            mode: ExecutionMode::default(),
            parallel: 1,
        }
    }

    pub fn with_deploy_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.deploy_config_dir = dir.into();
        self
    }

    pub fn with_config_file_name(mut self, name: impl Into<String>) -> Self {
        self.config_file_name = name.into();
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// `<deploy_config_dir>/<app>/<environment>/<config_file_name>`
    pub fn manifest_path(&self) -> PathBuf {
        manifest_path(
            &self.deploy_config_dir,
            &self.app,
            &self.environment,
            &self.config_file_name,
        )
    }
}
