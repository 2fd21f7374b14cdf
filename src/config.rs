//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/preprocess-graph/preprocess-graph.toml`
//! 3. Local config: `<project_dir>/.preprocess-graph.toml`
//! 4. Environment variables: `PPGRAPH_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::RootFallback;

const APP_NAME: &str = "preprocess-graph";
const ENV_PREFIX: &str = "PPGRAPH";

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_fallback: Option<RootFallback>,
    pub strict_extra_mappings: Option<bool>,
    pub main_project: Option<String>,
}

/// Unified configuration for the project graph host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Root selection when the main project is not registered
    pub root_fallback: RootFallback,
    /// Treat missing extra mapping files as errors instead of warnings
    pub strict_extra_mappings: bool,
    /// Main project used when neither the command line nor the manifest names one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_project: Option<String>,
}

/// Get the XDG config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(format!(".{APP_NAME}.toml"))
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
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_fallback: overlay.root_fallback.unwrap_or(self.root_fallback),
            strict_extra_mappings: overlay
                .strict_extra_mappings
                .unwrap_or(self.strict_extra_mappings),
            main_project: overlay
                .main_project
                .clone()
                .or_else(|| self.main_project.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.preprocess-graph.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(
            global_config_path().as_deref(),
            project_dir,
            Self::env_source(),
        )
    }

    /// Load settings from an explicit global config file, project directory
    /// and environment source.
    pub fn load_layers(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current.apply_env_overrides(env)
    }

    /// Environment source for `PPGRAPH_*` variables.
    pub fn env_source() -> Environment {
        Environment::with_prefix(ENV_PREFIX).prefix_separator("_")
    }

    /// Apply PPGRAPH_* environment variables as explicit overrides.
    ///
    /// Unset variables are skipped; set but malformed ones are errors.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = present(config.get_string("root_fallback"))? {
            self.root_fallback = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Some(val) = present(config.get_bool("strict_extra_mappings"))? {
            self.strict_extra_mappings = val;
        }
        if let Some(val) = present(config.get_string("main_project"))? {
            self.main_project = Some(val);
        }

        Ok(self)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# preprocess-graph configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/preprocess-graph/preprocess-graph.toml
#   Local:  <project_dir>/.preprocess-graph.toml
#   Env:    PPGRAPH_* environment variables

# Root selection when the main project is not a registered node:
#   "first-registered" - use the first declared node (default)
#   "reject"           - fail the build
# root_fallback = "first-registered"

# Fail instead of warn when an extra mappings file does not exist
# strict_extra_mappings = false

# Main project used when the manifest does not name one
# main_project = "1.12.2"
"#
        .to_string()
    }
}

/// None for keys that are not set, an error for values that do not convert.
fn present<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
