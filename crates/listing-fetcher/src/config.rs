//! Configuration loading and resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::identity::{
    IdentityPool, DEFAULT_ACCEPT, DEFAULT_ACCEPT_ENCODING, DEFAULT_ACCEPT_LANGUAGES,
    DEFAULT_REFERERS, DEFAULT_USER_AGENTS,
};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "LISTING_FETCHER_CONFIG";

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Upper bound accepted for `timeout_ms` (5 minutes).
pub const MAX_TIMEOUT_MS: u64 = 300_000;

const LOCAL_CONFIG_PATH: &str = ".listing-fetcher/config.json";

/// On-disk configuration. Missing fields fall back to the built-in pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetcherConfig {
    pub timeout_ms: u64,
    pub user_agents: Vec<String>,
    pub accept_languages: Vec<String>,
    pub referers: Vec<String>,
    pub accept_encoding: String,
    pub accept: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agents: owned(DEFAULT_USER_AGENTS),
            accept_languages: owned(DEFAULT_ACCEPT_LANGUAGES),
            referers: owned(DEFAULT_REFERERS),
            accept_encoding: DEFAULT_ACCEPT_ENCODING.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(display.clone())
            } else {
                ConfigError::Io {
                    path: display.clone(),
                    source,
                }
            }
        })?;
        Self::parse(&text, &display)
    }

    /// Parse and validate config JSON held in memory.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: FetcherConfig =
            serde_json::from_str(text).map_err(|source| ConfigError::Json {
                path: origin.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "timeout_ms must be between 1 and {MAX_TIMEOUT_MS}, got {}",
                self.timeout_ms
            )));
        }
        self.identity_pool().map(|_| ())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the validated identity pool described by this config.
    pub fn identity_pool(&self) -> Result<IdentityPool, ConfigError> {
        IdentityPool::new(
            self.user_agents.clone(),
            self.accept_languages.clone(),
            self.referers.clone(),
            self.accept_encoding.clone(),
            self.accept.clone(),
        )
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` on the command line.
    Explicit(PathBuf),
    /// The `LISTING_FETCHER_CONFIG` environment variable.
    Env(PathBuf),
    /// `./.listing-fetcher/config.json`.
    Local(PathBuf),
    Builtin,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Env(p) | ConfigSource::Local(p) => {
                Some(p.as_path())
            }
            ConfigSource::Builtin => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(p) => write!(f, "{} (--config)", p.display()),
            ConfigSource::Env(p) => write!(f, "{} (${CONFIG_ENV_VAR})", p.display()),
            ConfigSource::Local(p) => write!(f, "{} (working directory)", p.display()),
            ConfigSource::Builtin => f.write_str("built-in defaults"),
        }
    }
}

/// Resolve the config source: explicit path, then the environment variable,
/// then the working-directory file, then built-in defaults.
///
/// Only an explicit path is returned without checking that it exists.
pub fn resolve_config_source(explicit: Option<&str>) -> ConfigSource {
    resolve_from(
        explicit,
        std::env::var(CONFIG_ENV_VAR).ok(),
        Path::new(LOCAL_CONFIG_PATH),
    )
}

fn resolve_from(explicit: Option<&str>, env_value: Option<String>, local: &Path) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(PathBuf::from(path));
    }

    if let Some(env_path) = env_value.filter(|v| !v.trim().is_empty()) {
        let env_path = PathBuf::from(env_path);
        if env_path.exists() {
            return ConfigSource::Env(env_path);
        }
        tracing::debug!(path = %env_path.display(), "{CONFIG_ENV_VAR} points at a missing file");
    }

    if local.exists() {
        return ConfigSource::Local(local.to_path_buf());
    }

    ConfigSource::Builtin
}

/// Resolve and load the effective configuration.
pub fn load_config(explicit: Option<&str>) -> Result<(FetcherConfig, ConfigSource), ConfigError> {
    let source = resolve_config_source(explicit);
    let config = load_from(&source)?;
    Ok((config, source))
}

fn load_from(source: &ConfigSource) -> Result<FetcherConfig, ConfigError> {
    match source.path() {
        Some(path) => FetcherConfig::load(path),
        None => Ok(FetcherConfig::default()),
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
