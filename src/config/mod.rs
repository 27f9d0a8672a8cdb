//! # Configuration
//!
//! Weekly World reads everything from the host's config directory:
//!
//! ```text
//! config/
//! ├── weekly_world_objectives.json   ← weekly challenge descriptor (re-read on use)
//! ├── weekly_world_server_env.json   ← API base URL and server secret
//! ├── weekly_world_player_data.json  ← per-player, per-world progress
//! └── world_identifiers.json         ← world key → world identifier
//! saves/                             ← one folder per world (sibling of config/)
//! ```
//!
//! The server environment file looks like:
//!
//! ```json
//! { "api_base": "https://api.weeklyworld.net", "server_secret": "..." }
//! ```
//!
//! A missing environment file is not fatal: the reporting client checks
//! [`EnvironmentConfig::is_configured`] and skips network work when it is `false`.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::logutil::redact;

pub const OBJECTIVES_FILE: &str = "weekly_world_objectives.json";
pub const SERVER_ENV_FILE: &str = "weekly_world_server_env.json";
pub const PLAYER_DATA_FILE: &str = "weekly_world_player_data.json";
pub const WORLD_IDENTIFIERS_FILE: &str = "world_identifiers.json";

/// Locations of the files and directories the core touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_dir: PathBuf,
    pub saves_dir: PathBuf,
}

impl Paths {
    /// Use `config_dir` and the host's default saves directory next to it.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let saves_dir = config_dir
            .parent()
            .map(|p| p.join("saves"))
            .unwrap_or_else(|| PathBuf::from("saves"));
        Self {
            config_dir,
            saves_dir,
        }
    }

    pub fn with_saves_dir(mut self, saves_dir: impl Into<PathBuf>) -> Self {
        self.saves_dir = saves_dir.into();
        self
    }

    pub fn objectives_file(&self) -> PathBuf {
        self.config_dir.join(OBJECTIVES_FILE)
    }

    pub fn server_env_file(&self) -> PathBuf {
        self.config_dir.join(SERVER_ENV_FILE)
    }

    pub fn player_data_file(&self) -> PathBuf {
        self.config_dir.join(PLAYER_DATA_FILE)
    }

    pub fn world_identifiers_file(&self) -> PathBuf {
        self.config_dir.join(WORLD_IDENTIFIERS_FILE)
    }
}

/// Contents of `weekly_world_server_env.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEnvironment {
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub server_secret: Option<String>,
}

impl ServerEnvironment {
    /// Read the file, logging instead of failing. A missing or unreadable file
    /// yields an unconfigured environment.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Server environment config file not found: {}", path.display());
                return Self::default();
            }
            Err(e) => {
                error!("Failed to read server environment config {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str::<ServerEnvironment>(content.trim_start_matches('\0')) {
            Ok(env) => {
                info!(
                    "Server environment config loaded (api_base={}, secret={})",
                    env.api_base.as_deref().unwrap_or("<unset>"),
                    env.server_secret.as_deref().map(redact).unwrap_or_else(|| "<unset>".into())
                );
                env
            }
            Err(e) => {
                error!("Failed to parse server environment config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Base URL without a trailing slash.
    pub fn api_base(&self) -> Option<&str> {
        self.api_base.as_deref().map(|b| b.trim_end_matches('/'))
    }

    pub fn server_secret(&self) -> Option<&str> {
        self.server_secret.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.api_base.is_some() && self.server_secret.is_some()
    }
}

/// Lazily loaded, never reloaded server environment.
#[derive(Debug)]
pub struct EnvironmentConfig {
    path: PathBuf,
    env: OnceLock<ServerEnvironment>,
}

impl EnvironmentConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env: OnceLock::new(),
        }
    }

    /// An already-loaded environment (CLI overrides, tests).
    pub fn preloaded(env: ServerEnvironment) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(env);
        Self {
            path: PathBuf::new(),
            env: cell,
        }
    }

    pub fn get(&self) -> &ServerEnvironment {
        self.env.get_or_init(|| ServerEnvironment::load(&self.path))
    }

    pub fn api_base(&self) -> Option<&str> {
        self.get().api_base()
    }

    pub fn server_secret(&self) -> Option<&str> {
        self.get().server_secret()
    }

    pub fn is_configured(&self) -> bool {
        self.get().is_configured()
    }
}
