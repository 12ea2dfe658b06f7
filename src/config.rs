//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/annotransfer/annotransfer.toml`
//! 3. Local config: `<document_dir>/.annotransfer.toml`
//! 4. Environment variables: `ANNOTRANSFER_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::AnnotationError;
use crate::domain::{NamingConvention, DEFAULT_ROOT_ID, MATPLOTLIB_PREFIXES};

const APP_NAME: &str = "annotransfer";
const ENV_PREFIX: &str = "ANNOTRANSFER";

/// Naming rules that separate generated plot content from manual overlays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConventionConfig {
    /// Identifier of the top-level content group (default: "figure_1")
    pub root_id: String,
    /// Identifier prefixes of generated content, matched case-insensitively
    pub generated_prefixes: Vec<String>,
}

impl Default for ConventionConfig {
    fn default() -> Self {
        Self {
            root_id: DEFAULT_ROOT_ID.into(),
            generated_prefixes: MATPLOTLIB_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Raw convention config for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawConventionConfig {
    pub root_id: Option<String>,
    pub generated_prefixes: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub conventions: RawConventionConfig,
}

impl ConventionConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        // Sorted for deterministic --show-config output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base).
    ///
    /// - `root_id`: overlay wins if Some, otherwise keep base
    /// - `generated_prefixes`: union merge with negation support (if overlay specified)
    pub fn merge(&self, overlay: &RawConventionConfig) -> Self {
        Self {
            root_id: overlay
                .root_id
                .clone()
                .unwrap_or_else(|| self.root_id.clone()),
            generated_prefixes: overlay
                .generated_prefixes
                .as_ref()
                .map(|o| Self::merge_array(&self.generated_prefixes, o))
                .unwrap_or_else(|| self.generated_prefixes.clone()),
        }
    }

    /// Apply global config onto defaults.
    ///
    /// Unlike `merge()`, arrays use REPLACE semantics: a prefix list in the
    /// global file is the complete baseline, not an addition to the defaults.
    pub fn apply_global(&self, global: &RawConventionConfig) -> Self {
        Self {
            root_id: global
                .root_id
                .clone()
                .unwrap_or_else(|| self.root_id.clone()),
            generated_prefixes: global
                .generated_prefixes
                .clone()
                .unwrap_or_else(|| self.generated_prefixes.clone()),
        }
    }
}

/// Unified configuration for annotransfer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Naming conventions of the plotting back-end
    pub conventions: ConventionConfig,
}

/// Get the XDG config directory for annotransfer.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file next to a document.
pub fn local_config_path(document_dir: &Path) -> PathBuf {
    document_dir.join(format!(".{APP_NAME}.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, AnnotationError> {
    let content = std::fs::read_to_string(path).map_err(|e| AnnotationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| AnnotationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Environment source for `ANNOTRANSFER_CONVENTIONS__*` variables.
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("conventions.generated_prefixes")
}

impl Settings {
    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            conventions: self.conventions.merge(&overlay.conventions),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            conventions: self.conventions.apply_global(&global.conventions),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `document_dir` - Optional directory of the document being modified, for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults (matplotlib conventions)
    /// 2. Global config: `$XDG_CONFIG_HOME/annotransfer/annotransfer.toml` (arrays REPLACE defaults)
    /// 3. Local config: `<document_dir>/.annotransfer.toml` (arrays UNION with global)
    /// 4. Environment variables: `ANNOTRANSFER_*` prefix (REPLACES - explicit override)
    pub fn load(document_dir: Option<&Path>) -> Result<Self, AnnotationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = document_dir {
            current = current.with_local(dir)?;
        }

        Self::apply_env_overrides(current, env_source())
    }

    /// Merge `<document_dir>/.annotransfer.toml` onto self, if present.
    pub fn with_local(self, document_dir: &Path) -> Result<Self, AnnotationError> {
        let local_path = local_config_path(document_dir);
        if !local_path.exists() {
            return Ok(self);
        }
        debug!("loading local config {}", local_path.display());
        let raw = load_raw_settings(&local_path)?;
        Ok(self.merge_with(&raw))
    }

    /// Apply environment variables as explicit overrides.
    ///
    /// Env vars replace values (not merge) - they are explicit user overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, AnnotationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("conventions.root_id") {
            settings.conventions.root_id = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("conventions.generated_prefixes") {
            settings.conventions.generated_prefixes = val;
        }

        Ok(settings)
    }

    /// The naming convention these settings describe.
    pub fn naming_convention(&self) -> NamingConvention {
        NamingConvention::new(
            self.conventions.root_id.clone(),
            &self.conventions.generated_prefixes,
        )
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, AnnotationError> {
        toml::to_string_pretty(self).map_err(|e| AnnotationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> AnnotationError {
    AnnotationError::Config {
        message: e.to_string(),
    }
}
