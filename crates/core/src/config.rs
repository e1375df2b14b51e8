//! TOML-based configuration for remerge.
//!
//! Every field has a default, so an absent or empty file is a valid
//! configuration. Command-line flags are applied on top of the loaded
//! values by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// File name looked up under the user's configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the user's configuration directory.
pub const CONFIG_DIR_NAME: &str = "remerge";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which resolution heuristics run.
    #[serde(default)]
    pub resolution: ResolutionOptions,

    /// Conflicted-file discovery settings.
    #[serde(default)]
    pub vcs: VcsConfig,

    /// Logging and reporting settings.
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Switches for each resolution heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOptions {
    /// Resolve when only one side changed, or both changed identically.
    #[serde(default = "default_true")]
    pub trivial: bool,

    /// Pull lines shared by all sides out of the top and bottom of a conflict.
    #[serde(default = "default_true")]
    pub reduce: bool,

    /// Resolve indentation separately from the text it indents.
    #[serde(default = "default_true")]
    pub indentation: bool,

    /// Keep both sides when each added lines at opposite ends of base.
    #[serde(default = "default_true")]
    pub added_lines: bool,

    /// Make a side whose line endings differ from the other two match them.
    #[serde(default = "default_true")]
    pub line_endings: bool,

    /// Expand tabs to this width before resolving (disabled when absent).
    #[serde(default)]
    pub untabify_width: Option<usize>,

    /// Split conflicts on `~~~~~~~` separator lines.
    #[serde(default = "default_true")]
    pub split_on_markers: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            trivial: true,
            reduce: true,
            indentation: true,
            added_lines: true,
            line_endings: true,
            untabify_width: None,
            split_on_markers: true,
        }
    }
}

// ---------------------------------------------------------------------------
// VCS
// ---------------------------------------------------------------------------

/// Which version control tool lists conflicted files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsPreference {
    /// Try Jujutsu first, then Git.
    #[default]
    Auto,
    /// Jujutsu (`jj`).
    #[serde(alias = "jj")]
    Jujutsu,
    /// Git.
    Git,
}

/// Conflicted-file discovery configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsConfig {
    #[serde(default)]
    pub backend: VcsPreference,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Logging and reporting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Minimum tracing level: trace, debug, info, warn, error, off.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Suppress per-file lines and the summary.
    #[serde(default)]
    pub quiet: bool,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            quiet: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// The per-user configuration file, e.g. `~/.config/remerge/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the configuration to use for a run.
    ///
    /// An explicit path must exist. Without one, the per-user file is used
    /// when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::load_from_file(path)?,
                None => {
                    debug!("no configuration file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate that all values are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.untabify_width == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "resolution.untabify_width".into(),
                detail: "tab width must be > 0".into(),
            });
        }
        if !LOG_LEVELS.contains(&self.output.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "output.log_level".into(),
                detail: format!(
                    "unknown level '{}', expected one of: {}",
                    self.output.log_level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }
}
