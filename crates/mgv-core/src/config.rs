// SPDX-License-Identifier: Apache-2.0

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_MGV_ROOT: &str = "MGV_ROOT";
pub const ENV_MGV_FEATURE_SIZE_LIMIT: &str = "MGV_FEATURE_SIZE_LIMIT";
pub const ENV_MGV_CONTIG_MAX_GAP: &str = "MGV_CONTIG_MAX_GAP";
pub const ENV_MGV_PACKER_GAP: &str = "MGV_PACKER_GAP";
pub const ENV_MGV_PACKER_RESET_SPAN: &str = "MGV_PACKER_RESET_SPAN";
pub const ENV_MGV_CACHE_DB_NAME: &str = "MGV_CACHE_DB_NAME";
pub const ENV_MGV_CACHE_DIR: &str = "MGV_CACHE_DIR";
pub const ENV_MGV_HTTP_TIMEOUT_MS: &str = "MGV_HTTP_TIMEOUT_MS";
pub const ENV_MGV_HTTP_MAX_ATTEMPTS: &str = "MGV_HTTP_MAX_ATTEMPTS";
pub const ENV_MGV_LOG_LEVEL: &str = "MGV_LOG_LEVEL";
pub const ENV_MGV_LOG_JSON: &str = "MGV_LOG_JSON";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigPathScope {
    User,
    Workspace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MgvConfig {
    /// Location the genome registrar starts discovery from.
    pub root_location: String,
    /// Features longer than this many bases are never registered.
    pub feature_size_limit: u64,
    /// A gap wider than this between consecutive features starts a new contig.
    pub contig_max_gap: u64,
    pub packer_gap: u64,
    /// Virtual span after which the feature packer forgets finished lanes.
    pub packer_reset_span: u64,
    pub cache_db_name: String,
    pub cache_dir: PathBuf,
    pub http_timeout_ms: u64,
    pub http_max_attempts: usize,
}

impl Default for MgvConfig {
    fn default() -> Self {
        Self {
            root_location: ".".to_string(),
            feature_size_limit: 3_000_000,
            contig_max_gap: 1_000_000,
            packer_gap: 0,
            packer_reset_span: 15_000,
            cache_db_name: "mgv-cache".to_string(),
            cache_dir: resolve_cache_dir(),
            http_timeout_ms: 15_000,
            http_max_attempts: 3,
        }
    }
}

impl MgvConfig {
    /// Defaults, then the TOML file (when given and present), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) if p.exists() => Self::from_toml_file(p)?,
            _ => Self::default(),
        };
        cfg.apply_env_with(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("could not read config '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::config(format!("invalid config: {e}")))
    }

    /// Overlays values from `lookup`; unparsable numbers keep the current value.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |name: &str, current: u64| {
            non_empty(name)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(current)
        };

        if let Some(root) = non_empty(ENV_MGV_ROOT) {
            self.root_location = root;
        }
        self.feature_size_limit = number(ENV_MGV_FEATURE_SIZE_LIMIT, self.feature_size_limit);
        self.contig_max_gap = number(ENV_MGV_CONTIG_MAX_GAP, self.contig_max_gap);
        self.packer_gap = number(ENV_MGV_PACKER_GAP, self.packer_gap);
        self.packer_reset_span = number(ENV_MGV_PACKER_RESET_SPAN, self.packer_reset_span);
        if let Some(name) = non_empty(ENV_MGV_CACHE_DB_NAME) {
            self.cache_db_name = name;
        }
        if let Some(dir) = non_empty(ENV_MGV_CACHE_DIR) {
            self.cache_dir = PathBuf::from(dir);
        }
        self.http_timeout_ms = number(ENV_MGV_HTTP_TIMEOUT_MS, self.http_timeout_ms);
        self.http_max_attempts =
            number(ENV_MGV_HTTP_MAX_ATTEMPTS, self.http_max_attempts as u64) as usize;
    }

    /// Directory holding the byte cache and key store for `cache_db_name`.
    #[must_use]
    pub fn cache_db_dir(&self) -> PathBuf {
        self.cache_dir.join(&self.cache_db_name)
    }
}

#[must_use]
pub fn resolve_cache_dir() -> PathBuf {
    if let Ok(explicit) = std::env::var(ENV_MGV_CACHE_DIR) {
        let trimmed = explicit.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    if let Ok(xdg_cache_home) = std::env::var("XDG_CACHE_HOME") {
        let trimmed = xdg_cache_home.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join("mgv");
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join(".cache").join("mgv");
        }
    }

    PathBuf::from(".mgv").join("cache")
}

#[must_use]
pub fn resolve_config_path(scope: ConfigPathScope) -> PathBuf {
    match scope {
        ConfigPathScope::User => {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                let trimmed = xdg_config_home.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed).join("mgv").join("config.toml");
                }
            }
            if let Ok(home) = std::env::var("HOME") {
                let trimmed = home.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed)
                        .join(".config")
                        .join("mgv")
                        .join("config.toml");
                }
            }
            PathBuf::from(".mgv").join("config.toml")
        }
        ConfigPathScope::Workspace => PathBuf::from(".mgv").join("config.toml"),
    }
}

/// First existing config file: the workspace one, then the user one.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    [ConfigPathScope::Workspace, ConfigPathScope::User]
        .into_iter()
        .map(resolve_config_path)
        .find(|path| path.is_file())
}
