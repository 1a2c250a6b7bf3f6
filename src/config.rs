//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/lootscale/lootscale.toml`
//! 3. Environment variables: `LOOTSCALE_*` prefix
//! 4. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, InvalidCountPolicy};

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "LOOTSCALE";

/// Loot file used when nothing else is configured.
pub const DEFAULT_LOOT_FILE: &str = "./Config/loot.xml";

/// Unified configuration for lootscale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Loot file to rescale (default: ./Config/loot.xml)
    pub loot_file: PathBuf,
    /// Handling of unparseable count values
    pub on_invalid: InvalidCountPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loot_file: PathBuf::from(DEFAULT_LOOT_FILE),
            on_invalid: InvalidCountPolicy::default(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub loot_file: Option<PathBuf>,
    pub on_invalid: Option<InvalidCountPolicy>,
}

/// Get the XDG config directory for lootscale.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "lootscale").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("lootscale.toml"))
}

/// Environment source for `LOOTSCALE_*` overrides.
pub fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Load settings from the global config file and the process environment.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_with(global_config_path().as_deref(), env_source())
    }

    /// Load settings from an explicit global config path and env source.
    ///
    /// A missing global config file is not an error.
    pub fn load_with(global: Option<&Path>, env: Environment) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();
        Ok(current)
    }

    /// Scalar merge: overlay wins if specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            loot_file: overlay
                .loot_file
                .clone()
                .unwrap_or_else(|| self.loot_file.clone()),
            on_invalid: overlay.on_invalid.unwrap_or(self.on_invalid),
        }
    }

    /// Apply LOOTSCALE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("loot_file") {
            settings.loot_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("on_invalid") {
            settings.on_invalid =
                InvalidCountPolicy::from_str(&val, true).map_err(|e| ApplicationError::Config {
                    message: format!("{ENV_PREFIX}_ON_INVALID: {e}"),
                })?;
        }

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.loot_file.to_string_lossy().as_ref());
        self.loot_file = PathBuf::from(expanded);
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# lootscale configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/lootscale/lootscale.toml
#   Env:    LOOTSCALE_* environment variables (LOOTSCALE_LOOT_FILE, LOOTSCALE_ON_INVALID)
#   Flags:  --file, --on-invalid

# Loot file to rescale, relative to the working directory ("~" and $VARS are expanded)
# loot_file = "./Config/loot.xml"

# What to do with count values that are neither "n" nor "min,max":
#   abort - stop without writing (default)
#   warn  - keep the value and print a warning
#   skip  - keep the value silently
# on_invalid = "abort"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
