//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hydrotree/hydrotree.toml`
//! 3. Local config: `<dir>/.hydrotree.toml`
//! 4. Environment variables: `HYDROTREE__*` prefix

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::node::{Delay, LockScope, NodeOptions};

/// Settings applied to every node of a composed network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SimulationSettings {
    /// Duration of the placeholder unit of work in milliseconds
    pub work_delay_ms: u64,
    /// Whether the node lock is held while the unit of work runs
    pub lock_scope: LockScope,
}

/// Where network descriptions are looked up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NetworkSettings {
    /// Network description used when no file is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub simulation: RawSimulationSettings,
    pub network: RawNetworkSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSimulationSettings {
    pub work_delay_ms: Option<u64>,
    pub lock_scope: Option<LockScope>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawNetworkSettings {
    pub file: Option<PathBuf>,
}

/// Unified configuration for hydrotree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub network: NetworkSettings,
}

/// Get the XDG config directory for hydrotree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hydrotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hydrotree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".hydrotree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> AppResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Collaborators handed to every node built with these settings.
    pub fn node_options(&self) -> NodeOptions {
        NodeOptions::new(
            Arc::new(Delay::from_millis(self.simulation.work_delay_ms)),
            self.simulation.lock_scope,
        )
    }

    fn expand_paths(&mut self) {
        if let Some(file) = self.network.file.as_ref() {
            self.network.file = Some(expand_path(file));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            simulation: SimulationSettings {
                work_delay_ms: overlay
                    .simulation
                    .work_delay_ms
                    .unwrap_or(self.simulation.work_delay_ms),
                lock_scope: overlay
                    .simulation
                    .lock_scope
                    .unwrap_or(self.simulation.lock_scope),
            },
            network: NetworkSettings {
                file: overlay
                    .network
                    .file
                    .clone()
                    .or_else(|| self.network.file.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.hydrotree.toml`
    pub fn load(local_dir: Option<&Path>) -> AppResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply HYDROTREE__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> AppResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("HYDROTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<u64>("simulation.work_delay_ms") {
            settings.simulation.work_delay_ms = val;
        }
        if let Ok(val) = config.get_string("simulation.lock_scope") {
            settings.simulation.lock_scope = parse_lock_scope(&val)?;
        }
        if let Ok(val) = config.get_string("network.file") {
            settings.network.file = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# hydrotree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/hydrotree/hydrotree.toml
#   Local:  <dir>/.hydrotree.toml  (select with -C <dir>)
#   Env:    HYDROTREE__SECTION__KEY environment variables

[simulation]
# Duration of the placeholder unit of work per node, in milliseconds
# work_delay_ms = 0

# "narrow": the node lock is released while the unit of work runs
# "exclusive": the node lock is held for the whole unit of work
# lock_scope = "narrow"

[network]
# Network description used when no file is given on the command line
# file = "~/basins/network.toml"
"#
        .to_string()
    }
}

fn parse_lock_scope(value: &str) -> AppResult<LockScope> {
    match value.trim().to_ascii_lowercase().as_str() {
        "narrow" => Ok(LockScope::Narrow),
        "exclusive" => Ok(LockScope::Exclusive),
        other => Err(AppError::Config {
            message: format!("unknown lock scope '{other}', expected 'narrow' or 'exclusive'"),
        }),
    }
}

fn config_err(e: ConfigError) -> AppError {
    AppError::Config {
        message: e.to_string(),
    }
}
