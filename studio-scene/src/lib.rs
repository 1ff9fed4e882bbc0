//! studio-scene: the drawable document behind the studio editor.
//!
//! Design rules:
//! - The document is plain serializable data; snapshots are its JSON form.
//! - The active selection is UI state and never part of a snapshot.
//! - Every mutation that a user would want to undo queues a `SceneEvent`.
//! - Restores are atomic: a snapshot that fails to decode leaves the scene untouched.

use egui::Color32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub mod document;
pub mod events;
pub mod object;
pub mod render;

pub use document::{Document, DocumentScene, SNAPSHOT_VERSION};
pub use events::SceneEvent;
pub use object::{
    decode_image, Filter, ImageObject, ObjectKind, Origin, PathObject, SceneObject, ShapeKind,
    ShapeObject, TextObject,
};
pub use render::{Bounds, DrawItem, Frame};

/// Stable identity of a scene object across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canvas coordinates in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An opaque sRGB color, stored in snapshots as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub Color32);

impl Color {
    pub const BLACK: Color = Color(Color32::BLACK);
    pub const WHITE: Color = Color(Color32::WHITE);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Color32::from_rgb(r, g, b))
    }

    /// Parse `#rgb` or `#rrggbb` (as produced by a color input).
    pub fn parse_hex(value: &str) -> Result<Self, SceneError> {
        let invalid = || SceneError::InvalidColor {
            value: value.to_string(),
        };

        let digits = value.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0.r(), self.0.g(), self.0.b())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::parse_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Scene-level errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unknown object: {id}")]
    UnknownObject { id: ObjectId },

    #[error("invalid color '{value}' (expected #rgb or #rrggbb)")]
    InvalidColor { value: String },

    #[error("canvas dimensions must be non-zero: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("object {id} has non-finite geometry")]
    NonFiniteGeometry { id: ObjectId },

    #[error("drag offset must be finite: ({dx}, {dy})")]
    NonFiniteOffset { dx: f32, dy: f32 },

    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("image {id} is {found:?} but snapshot says {expected:?}")]
    ImageSizeMismatch {
        id: ObjectId,
        expected: (u32, u32),
        found: (u32, u32),
    },
}
