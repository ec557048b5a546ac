//! Configuration for the autonomy hooks.
//!
//! Settings are resolved from three layers, highest priority first:
//!
//! 1. Environment variables (`AUTONOMY_MODE`, `AUTONOMY_MAX_CONTINUATIONS`,
//!    `AUTONOMY_HOME`, `AUTONOMY_DEBUG`, `AUTONOMY_PERMISSION_COMMAND`).
//! 2. The optional project file `<home>/.claude/autonomy-config.yaml`.
//! 3. Built-in defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file path relative to the base directory.
pub const CONFIG_FILE_PATH: &str = ".claude/autonomy-config.yaml";

/// Enables autonomous continuation.
pub const ENV_MODE: &str = "AUTONOMY_MODE";
/// Maximum continuations per session.
pub const ENV_MAX_CONTINUATIONS: &str = "AUTONOMY_MAX_CONTINUATIONS";
/// Base directory for persisted state.
pub const ENV_HOME: &str = "AUTONOMY_HOME";
/// Enables the debug log.
pub const ENV_DEBUG: &str = "AUTONOMY_DEBUG";
/// Shell command that decides tool permissions.
pub const ENV_PERMISSION_COMMAND: &str = "AUTONOMY_PERMISSION_COMMAND";

/// Default continuation budget per session.
pub const DEFAULT_MAX_CONTINUATIONS: u32 = 10;

/// Values that switch a flag off. Anything else that is set switches it on.
const OFF_VALUES: &[&str] = &["0", "false", "off", "disable"];

/// Project configuration stored in `.claude/autonomy-config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Continuation budget override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_continuations: Option<u32>,

    /// Whether hook events are appended to the debug log.
    #[serde(default)]
    pub debug_logging: bool,
}

impl ProjectConfig {
    /// Load config from a specific base directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        let config_path = Self::config_path(base_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config to a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = Self::config_path(base_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path for a base directory.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }
}

/// Resolved settings for one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Whether autonomous mode is on. When off, both hooks are no-ops.
    pub enabled: bool,
    /// Maximum continuations per session.
    pub max_continuations: u32,
    /// Base directory for persisted state and the debug log.
    pub home: PathBuf,
    /// Whether the debug log is written.
    pub debug: bool,
    /// External permission command for the pre-tool-use hook.
    pub permission_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_continuations: DEFAULT_MAX_CONTINUATIONS,
            home: PathBuf::from("."),
            debug: false,
            permission_command: None,
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is malformed or the project config cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through a variable lookup function.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is malformed or the project config cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup(ENV_HOME)
            .filter(|h| !h.trim().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        let project = ProjectConfig::load_from(&home)?.unwrap_or_default();

        let max_continuations = match lookup(ENV_MAX_CONTINUATIONS) {
            Some(raw) => parse_max_continuations(&raw)?,
            None => project.max_continuations.unwrap_or(DEFAULT_MAX_CONTINUATIONS),
        };

        let enabled = lookup(ENV_MODE).is_some_and(|v| is_on(&v));
        let debug = lookup(ENV_DEBUG).map_or(project.debug_logging, |v| is_on(&v));
        let permission_command =
            lookup(ENV_PERMISSION_COMMAND).filter(|cmd| !cmd.trim().is_empty());

        Ok(Self { enabled, max_continuations, home, debug, permission_command })
    }

    /// The directory holding session records.
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        crate::paths::sessions_dir(&self.home)
    }

    /// The directory whose templates override the built-in prompts.
    #[must_use]
    pub fn templates_dir(&self) -> PathBuf {
        crate::paths::templates_dir(&self.home)
    }
}

/// Interpret a flag value. Unknown values count as on.
#[must_use]
pub fn is_on(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    !OFF_VALUES.contains(&value.as_str())
}

fn parse_max_continuations(raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{ENV_MAX_CONTINUATIONS}={raw:?}: {e}")))
}
