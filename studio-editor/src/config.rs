//! Editor configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use studio_history::{HistoryConfig, HistoryConfigError};
use studio_scene::Color;
use thiserror::Error;

use crate::{ExportConfig, ExportError};

/// Canvas sizing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Canvas width on wide viewports.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Height as a multiple of width.
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f32,

    #[serde(default = "default_background")]
    pub background: Color,

    /// Viewports at or below this are treated as compact.
    #[serde(default = "default_compact_breakpoint")]
    pub compact_breakpoint: u32,

    /// Horizontal space kept free around the canvas.
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// The canvas follows the container only below this width.
    #[serde(default = "default_follow_below")]
    pub follow_below: u32,
}

fn default_width() -> u32 {
    600
}

fn default_aspect_ratio() -> f32 {
    1.3
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_compact_breakpoint() -> u32 {
    768
}

fn default_margin() -> u32 {
    40
}

fn default_follow_below() -> u32 {
    800
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            aspect_ratio: default_aspect_ratio(),
            background: default_background(),
            compact_breakpoint: default_compact_breakpoint(),
            margin: default_margin(),
            follow_below: default_follow_below(),
        }
    }
}

impl CanvasConfig {
    fn height_for(&self, width: u32) -> u32 {
        (width as f32 * self.aspect_ratio).round() as u32
    }

    /// Canvas size when the editor opens in a viewport this wide.
    pub fn initial_size(&self, viewport_width: u32) -> (u32, u32) {
        let width = if viewport_width > self.compact_breakpoint {
            self.width
        } else {
            viewport_width.saturating_sub(self.margin).max(1)
        };
        (width, self.height_for(width))
    }

    /// New canvas size after the container changed, if the canvas follows it.
    pub fn resized_size(&self, container_width: u32) -> Option<(u32, u32)> {
        let width = container_width.saturating_sub(self.margin);
        if width == 0 || width >= self.follow_below {
            return None;
        }
        Some((width, self.height_for(width)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            tracing::error!("canvas width cannot be zero");
            return Err(ConfigError::InvalidCanvas {
                reason: "width must be > 0".into(),
            });
        }

        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            tracing::error!(
                aspect_ratio = self.aspect_ratio,
                "aspect ratio must be positive"
            );
            return Err(ConfigError::InvalidCanvas {
                reason: format!("aspect_ratio {} must be > 0", self.aspect_ratio),
            });
        }

        if self.margin >= self.follow_below {
            tracing::warn!(
                margin = self.margin,
                follow_below = self.follow_below,
                "canvas will never follow the container"
            );
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        tracing::debug!("validating editor configuration");
        self.canvas.validate()?;
        self.history.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid canvas configuration: {reason}")]
    InvalidCanvas { reason: String },

    #[error("invalid history configuration: {0}")]
    History(#[from] HistoryConfigError),

    #[error("invalid export configuration: {0}")]
    Export(#[from] ExportError),
}

/// Load and validate a config file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<EditorConfig> {
    let path = path.as_ref();
    let data =
        fs::read_to_string(path).with_context(|| format!("read config file: {}", path.display()))?;
    let config: EditorConfig = serde_json::from_str(&data).context("parse config json")?;
    config
        .validate()
        .with_context(|| format!("validate config file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "editor config loaded");
    Ok(config)
}

/// Save a config as pretty JSON, creating parent directories.
pub fn save_config(path: impl AsRef<Path>, config: &EditorConfig) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(config).context("serialize config to json")?;
    fs::write(path, json).with_context(|| format!("write config file: {}", path.display()))?;
    Ok(())
}
