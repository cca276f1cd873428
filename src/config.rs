//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treeviz/treeviz.toml`
//! 3. Explicit config file passed on the command line
//! 4. Environment variables: `TREEVIZ_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{LayoutParams, TreeMode};

/// Traversal animation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TraversalSettings {
    /// Pause between two highlighted nodes
    pub step_delay_ms: u64,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self { step_delay_ms: 500 }
    }
}

/// Free-form (custom mode) editing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CustomSettings {
    /// Most children a node may receive by linking, 0 for unlimited
    pub max_children: usize,
}

impl Default for CustomSettings {
    fn default() -> Self {
        Self { max_children: 2 }
    }
}

impl CustomSettings {
    pub fn fan_out_limit(&self) -> Option<usize> {
        (self.max_children > 0).then_some(self.max_children)
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    default_mode: Option<TreeMode>,
    layout: RawLayout,
    traversal: RawTraversal,
    custom: RawCustom,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLayout {
    initial_offset_width: Option<f64>,
    initial_offset_height: Option<f64>,
    scaling_factor: Option<f64>,
    node_size: Option<f64>,
    root_top: Option<f64>,
    root_spacing: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTraversal {
    step_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCustom {
    max_children: Option<usize>,
}

/// Unified configuration for treeviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Mode a new session starts in
    pub default_mode: TreeMode,
    /// Layout spacing
    pub layout: LayoutParams,
    pub traversal: TraversalSettings,
    pub custom: CustomSettings,
}

/// Get the XDG config directory for treeviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeviz.toml"))
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

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let layout = &overlay.layout;
        Self {
            default_mode: overlay.default_mode.unwrap_or(self.default_mode),
            layout: LayoutParams {
                initial_offset_width: layout
                    .initial_offset_width
                    .unwrap_or(self.layout.initial_offset_width),
                initial_offset_height: layout
                    .initial_offset_height
                    .unwrap_or(self.layout.initial_offset_height),
                scaling_factor: layout.scaling_factor.unwrap_or(self.layout.scaling_factor),
                node_size: layout.node_size.unwrap_or(self.layout.node_size),
                root_top: layout.root_top.unwrap_or(self.layout.root_top),
                root_spacing: layout.root_spacing.unwrap_or(self.layout.root_spacing),
            },
            traversal: TraversalSettings {
                step_delay_ms: overlay
                    .traversal
                    .step_delay_ms
                    .unwrap_or(self.traversal.step_delay_ms),
            },
            custom: CustomSettings {
                max_children: overlay
                    .custom
                    .max_children
                    .unwrap_or(self.custom.max_children),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file; it must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/treeviz/treeviz.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `TREEVIZ_*` prefix, `__` between sections
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, if present
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config file");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        current = current.apply_env_overrides(env_source())?;

        current.validate()?;
        Ok(current)
    }

    /// Apply `TREEVIZ_*` variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("default_mode") {
            self.default_mode = val.parse().map_err(|message| ApplicationError::Config {
                message: format!("TREEVIZ_DEFAULT_MODE: {message}"),
            })?;
        }
        let layout = [
            ("layout.initial_offset_width", &mut self.layout.initial_offset_width),
            ("layout.initial_offset_height", &mut self.layout.initial_offset_height),
            ("layout.scaling_factor", &mut self.layout.scaling_factor),
            ("layout.node_size", &mut self.layout.node_size),
            ("layout.root_top", &mut self.layout.root_top),
            ("layout.root_spacing", &mut self.layout.root_spacing),
        ];
        for (key, field) in layout {
            if let Ok(val) = config.get_float(key) {
                *field = val;
            }
        }
        if let Ok(val) = config.get::<u64>("traversal.step_delay_ms") {
            self.traversal.step_delay_ms = val;
        }
        if let Ok(val) = config.get::<usize>("custom.max_children") {
            self.custom.max_children = val;
        }
        Ok(self)
    }

    /// Reject values the layout pass cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let layout = &self.layout;
        if !(layout.scaling_factor.is_finite() && layout.scaling_factor > 0.0) {
            return Err(ApplicationError::Config {
                message: format!(
                    "layout.scaling_factor must be positive, got {}",
                    layout.scaling_factor
                ),
            });
        }
        let lengths = [
            ("initial_offset_width", layout.initial_offset_width),
            ("initial_offset_height", layout.initial_offset_height),
            ("node_size", layout.node_size),
            ("root_top", layout.root_top),
            ("root_spacing", layout.root_spacing),
        ];
        if let Some((name, value)) = lengths.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ApplicationError::Config {
                message: format!("layout.{name} must be finite, got {value}"),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treeviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treeviz/treeviz.toml
#   File:   treeviz -c <file>
#   Env:    TREEVIZ_* environment variables, e.g. TREEVIZ_LAYOUT__NODE_SIZE=30

# Mode a new session starts in: bst, avl, binary, custom
# default_mode = "bst"

[layout]
# Horizontal offset of a root's children, divided by scaling_factor per level
# initial_offset_width = 200.0
# Vertical distance between levels
# initial_offset_height = 80.0
# scaling_factor = 2.0
# node_size = 25.0
# Top of the first root
# root_top = 40.0
# Horizontal gap between consecutive roots
# root_spacing = 80.0

[traversal]
# step_delay_ms = 500

[custom]
# Most children per node when linking by hand (0 = unlimited)
# max_children = 2
"#
        .to_string()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("TREEVIZ")
        .prefix_separator("_")
        .separator("__")
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
