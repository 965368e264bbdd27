use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

use crate::interceptor::InterceptorErrorMode;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }
}

/// Resolve a path relative to the config file directory.
///
/// Absolute paths are returned as-is; relative paths are joined with the
/// config file's parent directory, so behavior does not depend on the
/// current working directory.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Default cap on model invocations within a single turn.
pub const DEFAULT_MAX_TURNS: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum model invocations per turn before the engine stops with
    /// a turn-limit result.
    pub max_turns: u32,
    /// How interceptor chains treat a failing hook.
    pub interceptor_error_mode: InterceptorErrorMode,
    /// System instructions prepended to every model request.
    pub system_prompt: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            interceptor_error_mode: InterceptorErrorMode::default(),
            system_prompt: None,
        }
    }
}

// ============================================================================
// StorageConfig
// ============================================================================

/// Default conversations directory (relative to config file).
pub const DEFAULT_CONVERSATIONS_DIR: &str = ".turngate/conversations";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where conversation snapshots are persisted.
    pub conversations_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            conversations_dir: PathBuf::from(DEFAULT_CONVERSATIONS_DIR),
        }
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports the following syntax (shell-compatible):
/// - `${VAR}` - Required variable, errors if not set
/// - `${VAR:-default}` - Optional variable with default value
/// - `${VAR:-}` - Optional variable, empty string if not set
/// - `$$` - Escaped `$` (only needed before `{` to prevent expansion)
///
/// Nested expansion (`${VAR:-${OTHER}}`) is not supported; an unclosed
/// `${` is an error.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find('$') {
        result.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];

        if let Some(stripped) = after.strip_prefix('$') {
            // "$$" escapes to a literal "$".
            result.push('$');
            rest = stripped;
        } else if let Some(after_brace) = after.strip_prefix('{') {
            let end = after_brace
                .find('}')
                .ok_or(ConfigError::UnclosedVarReference)?;
            result.push_str(&resolve_var(&after_brace[..end])?);
            rest = &after_brace[end + 1..];
        } else {
            // A lone "$" stays literal.
            result.push('$');
            rest = after;
        }
    }

    result.push_str(rest);
    Ok(result)
}

/// Resolve one `NAME` or `NAME:-default` reference against the environment.
fn resolve_var(reference: &str) -> Result<String, ConfigError> {
    let (name, default) = match reference.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (reference, None),
    };

    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(_) => match default {
            Some(default) => Ok(default.to_string()),
            None => Err(ConfigError::MissingEnvVar(name.to_string())),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
