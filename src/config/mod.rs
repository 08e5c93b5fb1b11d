//! Deployment manifest handling
//!
//! A manifest lives at `<deploy-config-dir>/<app>/<environment>/<file>` and
//! has two sections:
//! 1. `common`: defaults shared by every server
//! 2. `servers`: one entry per host; entry values win over `common`

mod env_file;
mod loader;
mod types;

pub use env_file::{load_env_file, parse_env, render_env};
pub use loader::{load_manifest, manifest_path, normalize_list, resolve};
pub use types::{file_name, EnvVar, ServerConfig, KNOWN_KEYS};
