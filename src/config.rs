//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ranktree/ranktree.toml`
//! 3. Local config: a file passed explicitly (e.g. `--config`)
//! 4. Environment variables: `RANKTREE_*` prefix (`RANKTREE_RANK__STEP=50`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::rank::{RankAllocator, BASE_RANK, MIN_GAP, STEP};

/// Rank allocation settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankSettings {
    /// Distance between appended/prepended siblings
    pub step: f64,
    /// Rank of the first child in an empty sibling set
    pub base_rank: f64,
    /// Gap below which siblings are re-spaced before a midpoint insert
    pub min_gap: f64,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            step: STEP,
            base_rank: BASE_RANK,
            min_gap: MIN_GAP,
        }
    }
}

/// Raw rank settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRankSettings {
    pub step: Option<f64>,
    pub base_rank: Option<f64>,
    pub min_gap: Option<f64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub rank: RawRankSettings,
}

impl RankSettings {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawRankSettings) -> Self {
        Self {
            step: overlay.step.unwrap_or(self.step),
            base_rank: overlay.base_rank.unwrap_or(self.base_rank),
            min_gap: overlay.min_gap.unwrap_or(self.min_gap),
        }
    }

    pub fn allocator(&self) -> RankAllocator {
        RankAllocator::new(self.step, self.base_rank, self.min_gap)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        let finite = [self.step, self.base_rank, self.min_gap]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(config_message("rank settings must be finite numbers"));
        }
        if self.step <= 0.0 {
            return Err(config_message(format!("rank.step must be positive, got {}", self.step)));
        }
        if self.min_gap < 0.0 {
            return Err(config_message(format!(
                "rank.min_gap must not be negative, got {}",
                self.min_gap
            )));
        }
        Ok(())
    }
}

/// Unified configuration for ranktree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub rank: RankSettings,
}

/// Get the XDG config directory for ranktree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ranktree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ranktree.toml"))
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
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            rank: self.rank.merge(&overlay.rank),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file; unlike the global file it must exist
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit local config
        if let Some(path) = local {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.rank.validate()?;
        Ok(current)
    }

    /// Load only defaults and one file, skipping global config and env vars.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let settings = Self::default().merge_with(&raw);
        settings.rank.validate()?;
        Ok(settings)
    }

    /// Apply RANKTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RANKTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<f64>("rank.step") {
            settings.rank.step = val;
        }
        if let Ok(val) = config.get::<f64>("rank.base_rank") {
            settings.rank.base_rank = val;
        }
        if let Ok(val) = config.get::<f64>("rank.min_gap") {
            settings.rank.min_gap = val;
        }

        Ok(settings)
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| config_message(e.to_string()))
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

fn config_message(message: impl Into<String>) -> ApplicationError {
    ApplicationError::Config {
        message: message.into(),
    }
}
