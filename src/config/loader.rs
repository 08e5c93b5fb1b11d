//! Manifest loading and resolution
//!
//! The manifest is parsed into an untyped YAML tree and decoded here, at
//! the boundary, into one [`ServerConfig`] per server. Nothing downstream
//! sees untyped values.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml_ng::{Mapping, Value};

use crate::domain::value_objects::KeepReleases;
use crate::error::{ConfigError, ConfigResult, KeyLocation};

use super::env_file::load_env_file;
use super::types::{
    resolve_home_path, ServerConfig, DEFAULT_CLONE_DEPTH, DEFAULT_PORT, KNOWN_KEYS,
    TOP_LEVEL_KEYS,
};

/// `<deploy_config_dir>/<app>/<environment>/<file_name>`
pub fn manifest_path(
    deploy_config_dir: &Path,
    app: &str,
    environment: &str,
    file_name: &str,
) -> PathBuf {
    deploy_config_dir.join(app).join(environment).join(file_name)
}

/// Read a manifest from disk and resolve it.
pub fn load_manifest(path: &Path) -> ConfigResult<Vec<ServerConfig>> {
    if !path.is_file() {
        return Err(ConfigError::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    resolve(&content)
}

/// Resolve manifest text into one config per server, in manifest order.
///
/// All-or-nothing: any problem in any server fails the whole manifest.
pub fn resolve(content: &str) -> ConfigResult<Vec<ServerConfig>> {
    let root: Value = serde_yaml_ng::from_str(content)?;
    let root = match root {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => {
            return Err(ConfigError::InvalidType {
                key: "<manifest>".to_string(),
                location: KeyLocation::TopLevel,
                expected: "a mapping with 'common' and 'servers'",
            })
        }
    };

    check_keys(&root, TOP_LEVEL_KEYS, KeyLocation::TopLevel)?;

    let common = match root.get("common") {
        None | Some(Value::Null) => return Err(ConfigError::MissingSection { section: "common" }),
        Some(Value::Mapping(map)) => map,
        Some(_) => {
            return Err(ConfigError::InvalidType {
                key: "common".to_string(),
                location: KeyLocation::TopLevel,
                expected: "a mapping",
            })
        }
    };
    check_keys(common, KNOWN_KEYS, KeyLocation::Common)?;

    let servers = match root.get("servers") {
        None | Some(Value::Null) => return Err(ConfigError::EmptyServers),
        Some(Value::Sequence(seq)) if seq.is_empty() => return Err(ConfigError::EmptyServers),
        Some(Value::Sequence(seq)) => seq,
        Some(_) => {
            return Err(ConfigError::InvalidType {
                key: "servers".to_string(),
                location: KeyLocation::TopLevel,
                expected: "a list of mappings",
            })
        }
    };

    // Every entry's keys are checked before any is decoded, so a typo is
    // reported even when an earlier server is also invalid.
    let entries = servers
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Mapping(map) => {
                check_keys(map, KNOWN_KEYS, KeyLocation::Server(index))?;
                Ok(map)
            }
            _ => Err(ConfigError::InvalidType {
                key: "servers".to_string(),
                location: KeyLocation::Server(index),
                expected: "a mapping",
            }),
        })
        .collect::<ConfigResult<Vec<&Mapping>>>()?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, server)| resolve_server(common, server, index))
        .collect()
}

/// Merge `common` with one server entry and decode the result.
fn resolve_server(common: &Mapping, server: &Mapping, index: usize) -> ConfigResult<ServerConfig> {
    let mut merged = common.clone();
    for (key, value) in server {
        merged.insert(key.clone(), value.clone());
    }
    let fields = Fields {
        merged: &merged,
        server,
        index,
    };

    let source_code_url = fields.required("source_code_url")?;
    let branch = fields.required("branch")?;
    let project_root = fields.required("project_root")?;
    let project_user = fields.required("project_user")?;
    let venv_dir = fields.required("venv_dir")?;
    let host = fields.required("host")?;

    let clone_depth = match fields.integer("clone_depth")? {
        None => DEFAULT_CLONE_DEPTH,
        Some(depth) => u32::try_from(depth)
            .map_err(|_| fields.invalid("clone_depth", "a non-negative integer"))?,
    };

    let keep_releases = fields
        .integer("keep_releases")?
        .map(KeepReleases::from_configured)
        .unwrap_or_default();

    let port = match fields.integer("port")? {
        None => DEFAULT_PORT,
        Some(port) => u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| fields.invalid("port", "an integer between 1 and 65535"))?,
    };

    let env_file = fields.optional_string("env_file")?.map(PathBuf::from);
    let env_vars = match &env_file {
        Some(path) => load_env_file(path, index)?,
        None => Vec::new(),
    };

    Ok(ServerConfig {
        project_root: resolve_home_path(&project_user, &project_root),
        venv_dir: resolve_home_path(&project_user, &venv_dir),
        source_code_url,
        branch,
        clone_depth,
        revision: fields.optional_string("revision")?,
        keep_releases,
        system_packages: fields.list("system_packages")?,
        env_file,
        env_vars,
        ssh_known_hosts: fields.list("ssh_known_hosts")?,
        service_file: fields.optional_string("service_file")?.map(PathBuf::from),
        secrets: fields
            .list("secrets")?
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        host,
        port,
        run_migrations: fields.boolean("run_migrations")?,
        collect_static_files: fields.boolean("collect_static_files")?,
        project_user,
    })
}

/// Split a list field given as one string on `;` and whitespace.
///
/// Idempotent: normalizing the joined output yields the same list.
pub fn normalize_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ';' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_keys(map: &Mapping, allowed: &[&str], location: KeyLocation) -> ConfigResult<()> {
    for key in map.keys() {
        let name = key_name(key);
        if !allowed.contains(&name.as_str()) {
            return Err(ConfigError::UnknownKey {
                suggestion: suggest_key(&name, allowed),
                key: name,
                location,
            });
        }
    }
    Ok(())
}

fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "~".to_string(),
        _ => "<complex key>".to_string(),
    }
}

/// Typed access to one merged server mapping.
struct Fields<'a> {
    merged: &'a Mapping,
    server: &'a Mapping,
    index: usize,
}

impl Fields<'_> {
    /// Null counts as absent.
    fn get(&self, key: &str) -> Option<&Value> {
        self.merged.get(key).filter(|v| !v.is_null())
    }

    /// Report values against the section they came from.
    fn location(&self, key: &str) -> KeyLocation {
        if self.server.contains_key(key) {
            KeyLocation::Server(self.index)
        } else {
            KeyLocation::Common
        }
    }

    fn invalid(&self, key: &str, expected: &'static str) -> ConfigError {
        ConfigError::InvalidType {
            key: key.to_string(),
            location: self.location(key),
            expected,
        }
    }

    fn required(&self, key: &'static str) -> ConfigResult<String> {
        self.optional_string(key)?
            .ok_or(ConfigError::MissingRequired {
                key,
                server_index: self.index,
            })
    }

    /// Strings and numbers are accepted (a short SHA may parse as a number).
    /// Blank strings count as absent.
    fn optional_string(&self, key: &str) -> ConfigResult<Option<String>> {
        let text = match self.get(key) {
            None => return Ok(None),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => return Err(self.invalid(key, "a string")),
        };
        Ok(Some(text).filter(|t| !t.is_empty()))
    }

    fn integer(&self, key: &str) -> ConfigResult<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(key, "an integer")),
            Some(_) => Err(self.invalid(key, "an integer")),
        }
    }

    fn boolean(&self, key: &str) -> ConfigResult<bool> {
        match self.get(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.invalid(key, "true or false")),
        }
    }

    fn list(&self, key: &str) -> ConfigResult<Vec<String>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(normalize_list(s)),
            Some(Value::Sequence(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => {
                            let s = s.trim();
                            if !s.is_empty() {
                                out.push(s.to_string());
                            }
                        }
                        Value::Number(n) => out.push(n.to_string()),
                        _ => return Err(self.invalid(key, "a list of strings")),
                    }
                }
                Ok(out)
            }
            Some(_) => Err(self.invalid(key, "a list or a separated string")),
        }
    }
}

/// Closest allowed key within edit distance 2.
pub(crate) fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &candidate in candidates {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ac) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, bc) in b.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b.len()]
}
