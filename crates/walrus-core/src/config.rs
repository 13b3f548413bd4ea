//! `walrus.toml` configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file looked up next to a script.
pub const CONFIG_FILE: &str = "walrus.toml";

/// Default limit on nested function calls. Fits a 2 MiB thread stack.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Largest accepted `max_call_depth`. Depths above the default need a thread
/// with a larger stack, such as the one `walrus run` spawns.
pub const MAX_CALL_DEPTH_LIMIT: usize = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub builtins: BuiltinsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    /// Maximum depth of nested function calls
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuiltinsConfig {
    /// Built-in functions to leave out of the registry
    pub disabled: Vec<String>,
}

impl Config {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let depth = self.interpreter.max_call_depth;
        if depth == 0 || depth > MAX_CALL_DEPTH_LIMIT {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: format!(
                    "`interpreter.max_call_depth` must be between 1 and {}, found {}",
                    MAX_CALL_DEPTH_LIMIT, depth
                ),
            });
        }
        Ok(())
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content, path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `walrus.toml` from `dir`, falling back to defaults when absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
