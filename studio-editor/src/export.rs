//! Raster export.
//!
//! The editor prepares a clean frame (no selection handles) and a target
//! path; the host rasterizes the frame and hands the RGBA pixels back for
//! encoding.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use studio_history::Scene;
use studio_scene::{DocumentScene, Frame};
use thiserror::Error;

use crate::Editor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "creative-studio-edit.png".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

impl ExportConfig {
    /// Check the file name is a plain `.png` name.
    pub fn validate(&self) -> Result<(), ExportError> {
        let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
        for ch in invalid_chars {
            if self.file_name.contains(ch) {
                tracing::error!(
                    file_name = %self.file_name,
                    invalid_char = %ch,
                    "file name contains invalid character"
                );
                return Err(ExportError::InvalidFileName {
                    reason: format!("contains invalid character '{}'", ch),
                });
            }
        }

        if !self.file_name.to_lowercase().ends_with(".png") || self.file_name.len() <= 4 {
            return Err(ExportError::InvalidFileName {
                reason: format!("'{}' is not a .png file name", self.file_name),
            });
        }

        Ok(())
    }

    pub fn output_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.file_name)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export file name: {reason}")]
    InvalidFileName { reason: String },

    #[error("pixel buffer is {found} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },
}

/// A frame ready to be rasterized and written to `path`.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub path: PathBuf,
    pub frame: Frame,
}

impl ExportJob {
    /// Encode the host's rendering of `frame` as PNG at `path`.
    pub fn write_png(&self, rgba: Vec<u8>) -> anyhow::Result<()> {
        let (width, height) = (self.frame.width, self.frame.height);
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ExportError::BufferSize {
                width,
                height,
                expected,
                found: rgba.len(),
            }
            .into());
        }

        let pixels = image::RgbaImage::from_raw(width, height, rgba)
            .context("build image from pixel buffer")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir: {}", parent.display()))?;
        }
        pixels
            .save_with_format(&self.path, image::ImageFormat::Png)
            .with_context(|| format!("write png: {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), width, height, "export written");
        Ok(())
    }
}

impl Editor<DocumentScene> {
    /// Deselect, render, and describe the file to write.
    pub fn export(&mut self, config: &ExportConfig, dir: impl AsRef<Path>) -> ExportJob {
        self.scene.discard_active();
        self.scene.render();
        let job = ExportJob {
            path: config.output_path(dir),
            frame: self.scene.frame().clone(),
        };
        tracing::debug!(
            path = %job.path.display(),
            items = job.frame.items.len(),
            "export prepared"
        );
        job
    }
}
