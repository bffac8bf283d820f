use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::{ConnectionSettings, ENV_CLIENT, ENV_PASSWORD, ENV_PORT, ENV_USER};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Missing connection setting: {0}")]
    Missing(&'static str),
}

/// Connection settings as they appear in `.p4kit.toml`. Every field is
/// optional so layers can be stacked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct P4kitConfig {
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub client: Option<String>,
    pub verbose: Option<bool>,
    /// Path to the p4 binary, when it is not on PATH.
    pub binary: Option<PathBuf>,
}

impl P4kitConfig {
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            env.get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            port: get(ENV_PORT),
            user: get(ENV_USER),
            // Not trimmed: surrounding spaces may be part of the password.
            password: env
                .get(ENV_PASSWORD)
                .filter(|value| !value.is_empty())
                .cloned(),
            client: get(ENV_CLIENT),
            verbose: None,
            binary: None,
        }
    }

    /// Fills unset fields from `fallback`.
    pub fn or(self, fallback: P4kitConfig) -> Self {
        Self {
            port: self.port.or(fallback.port),
            user: self.user.or(fallback.user),
            password: self.password.or(fallback.password),
            client: self.client.or(fallback.client),
            verbose: self.verbose.or(fallback.verbose),
            binary: self.binary.or(fallback.binary),
        }
    }

    pub fn into_settings(self) -> Result<ConnectionSettings, ConfigError> {
        Ok(ConnectionSettings {
            port: self.port.ok_or(ConfigError::Missing("port"))?,
            user: self.user.ok_or(ConfigError::Missing("user"))?,
            // Ticket based logins need no password.
            password: self.password.unwrap_or_default(),
            client: self.client.ok_or(ConfigError::Missing("client"))?,
            verbose: self.verbose.unwrap_or(false),
            binary: self.binary,
        })
    }
}

pub fn config_filename_candidates() -> [&'static str; 2] {
    [".p4kit.toml", ".p4kitrc"]
}

pub fn resolve_p4kit_home_dir() -> Option<PathBuf> {
    if let Ok(value) = std::env::var("P4KIT_HOME") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    for key in ["HOME", "USERPROFILE"] {
        if let Ok(home) = std::env::var(key) {
            let trimmed = home.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed).join(".p4kit"));
            }
        }
    }
    None
}

pub fn global_config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn find_config_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    for candidate in start.ancestors() {
        for name in config_filename_candidates() {
            if candidate.join(name).is_file() {
                return Some(candidate.to_path_buf());
            }
        }
    }
    None
}

pub fn load_config(root: &Path) -> Result<Option<P4kitConfig>, ConfigError> {
    for name in config_filename_candidates() {
        let path = root.join(name);
        if path.is_file() {
            return read_config(&path).map(Some);
        }
    }
    Ok(None)
}

pub fn load_global_config(home: &Path) -> Result<Option<P4kitConfig>, ConfigError> {
    let path = global_config_path(home);
    if !path.is_file() {
        return Ok(None);
    }
    read_config(&path).map(Some)
}

fn read_config(path: &Path) -> Result<P4kitConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Stacks `explicit` > `env` > nearest project file above `start` > global
/// file under `home`.
pub fn resolve_settings_with(
    explicit: P4kitConfig,
    env: &HashMap<String, String>,
    start: &Path,
    home: Option<&Path>,
) -> Result<ConnectionSettings, ConfigError> {
    let project = match find_config_root(start) {
        Some(root) => load_config(&root)?.unwrap_or_default(),
        None => P4kitConfig::default(),
    };
    let global = match home {
        Some(home) => load_global_config(home)?.unwrap_or_default(),
        None => P4kitConfig::default(),
    };
    explicit
        .or(P4kitConfig::from_env_map(env))
        .or(project)
        .or(global)
        .into_settings()
}

pub fn resolve_settings(
    explicit: P4kitConfig,
    start: &Path,
) -> Result<ConnectionSettings, ConfigError> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let home = resolve_p4kit_home_dir();
    resolve_settings_with(explicit, &env, start, home.as_deref())
}
