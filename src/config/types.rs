//! Resolved per-server configuration

use std::path::{Path, PathBuf};

use crate::domain::ports::SessionTarget;
use crate::domain::value_objects::{KeepReleases, ReleaseId};

/// Keys accepted in `common` and in each `servers[]` entry.
pub const KNOWN_KEYS: &[&str] = &[
    "source_code_url",
    "branch",
    "clone_depth",
    "revision",
    "project_root",
    "project_user",
    "venv_dir",
    "keep_releases",
    "system_packages",
    "env_file",
    "ssh_known_hosts",
    "service_file",
    "secrets",
    "host",
    "port",
    "run_migrations",
    "collect_static_files",
];

/// Keys accepted at the top level of the manifest.
pub const TOP_LEVEL_KEYS: &[&str] = &["common", "servers"];

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CLONE_DEPTH: u32 = 1;

/// One `KEY=VALUE` pair from the env file. `value` is already shell-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

/// Fully resolved configuration for one server.
///
/// `common` merged with exactly one `servers[]` entry, validated and
/// normalized. Built once per run and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub source_code_url: String,
    pub branch: String,
    /// History depth for the clone; 0 means full history
    pub clone_depth: u32,
    pub revision: Option<String>,
    /// Absolute path on the server
    pub project_root: String,
    pub project_user: String,
    /// Absolute path on the server
    pub venv_dir: String,
    pub keep_releases: KeepReleases,
    pub system_packages: Vec<String>,
    pub env_file: Option<PathBuf>,
    /// Parsed contents of `env_file`, in file order
    pub env_vars: Vec<EnvVar>,
    pub ssh_known_hosts: Vec<String>,
    pub service_file: Option<PathBuf>,
    pub secrets: Vec<PathBuf>,
    pub host: String,
    pub port: u16,
    pub run_migrations: bool,
    pub collect_static_files: bool,
}

impl ServerConfig {
    pub fn releases_dir(&self) -> String {
        format!("{}/releases", self.project_root)
    }

    pub fn release_dir(&self, release_id: &ReleaseId) -> String {
        format!("{}/{}", self.releases_dir(), release_id.as_dir_name())
    }

    pub fn current_dir(&self) -> String {
        format!("{}/current", self.project_root)
    }

    pub fn shared_dir(&self) -> String {
        format!("{}/shared", self.project_root)
    }

    pub fn python_path(&self) -> String {
        format!("{}/bin/python", self.venv_dir)
    }

    pub fn pip_path(&self) -> String {
        format!("{}/bin/pip", self.venv_dir)
    }

    /// Unit name taken from the service file's basename
    pub fn service_name(&self) -> Option<String> {
        self.service_file.as_deref().and_then(file_name)
    }

    /// Depth to pass to `git clone --depth`, or `None` for a full clone.
    ///
    /// A pinned revision always gets a full clone since a shallow history
    /// cannot be assumed to contain it.
    pub fn effective_clone_depth(&self) -> Option<u32> {
        if self.revision.is_some() || self.clone_depth == 0 {
            None
        } else {
            Some(self.clone_depth)
        }
    }

    pub fn session_target(&self) -> SessionTarget {
        SessionTarget::new(self.host.clone(), self.port, self.project_user.clone())
    }
}

/// Basename of a local path as UTF-8
pub fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Place a relative remote path under the user's home directory.
pub fn resolve_home_path(user: &str, path: &str) -> String {
    let trimmed = path.trim();
    let resolved = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/home/{}/{}", user, trimmed.trim_start_matches("./"))
    };

    if resolved.len() > 1 {
        resolved.trim_end_matches('/').to_string()
    } else {
        resolved
    }
}
