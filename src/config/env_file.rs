//! Env file parsing
//!
//! Reads `KEY=VALUE` files and escapes every value for the remote shell.
//! Escaping happens here, once, so no later step can forget it.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::shell;

use super::types::EnvVar;

/// Read and parse an env file. A later assignment to the same key replaces
/// the earlier one in place.
pub fn load_env_file(path: &Path, server_index: usize) -> ConfigResult<Vec<EnvVar>> {
    if !path.is_file() {
        return Err(ConfigError::EnvFileNotFound {
            path: path.to_path_buf(),
            server_index,
        });
    }
    let content = fs::read_to_string(path)?;
    parse_env(&content, path)
}

/// Parse env file content. `path` is only used in error messages.
pub fn parse_env(content: &str, path: &Path) -> ConfigResult<Vec<EnvVar>> {
    let mut vars: Vec<EnvVar> = Vec::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let invalid = |message: &str| ConfigError::InvalidEnvFile {
            path: path.to_path_buf(),
            line: index + 1,
            message: message.to_string(),
        };

        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| invalid("expected KEY=VALUE"))?;

        let key = key.trim();
        if !is_valid_key(key) {
            return Err(invalid(&format!("invalid variable name '{}'", key)));
        }

        let value = unquote(value.trim()).ok_or_else(|| invalid("unterminated quoted value"))?;
        let var = EnvVar {
            key: key.to_string(),
            value: shell::quote(&value),
        };

        match vars.iter_mut().find(|existing| existing.key == var.key) {
            Some(existing) => *existing = var,
            None => vars.push(var),
        }
    }

    Ok(vars)
}

/// Render variables as the remote `.env` file body.
pub fn render_env(vars: &[EnvVar]) -> String {
    vars.iter()
        .map(|var| format!("{}={}\n", var.key, var.value))
        .collect()
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip surrounding quotes. Double quotes understand `\"`, `\\`, `\n`;
/// single quotes are literal. Unquoted values end at ` #`.
fn unquote(value: &str) -> Option<String> {
    if let Some(rest) = value.strip_prefix('\'') {
        let end = rest.find('\'')?;
        return Some(rest[..end].to_string());
    }

    if let Some(rest) = value.strip_prefix('"') {
        let mut out = String::new();
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => return Some(out),
                '\\' => match chars.next()? {
                    'n' => out.push('\n'),
                    other @ ('"' | '\\') => out.push(other),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                other => out.push(other),
            }
        }
        return None;
    }

    let value = match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    };
    Some(value.to_string())
}
