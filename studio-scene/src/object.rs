//! Drawable objects.
//!
//! Objects carry geometry and style only. Rendering, hit-testing and filter
//! pixel math belong to whatever draws a `Frame`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Bounds, Color, ObjectId, Point, SceneError};

/// Average glyph advance relative to font size, for text bounds.
const GLYPH_ADVANCE: f32 = 0.6;
/// Default line height relative to font size.
const LINE_HEIGHT: f32 = 1.16;

pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Which point of the object `left`/`top` refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    #[default]
    TopLeft,
    Center,
}

/// Image filters. Stored on the object and applied by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Grayscale,
    Sepia,
    Invert,
}

impl Filter {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "grayscale" => Some(Filter::Grayscale),
            "sepia" => Some(Filter::Sepia),
            "invert" => Some(Filter::Invert),
            _ => None,
        }
    }
}

/// A raster image with its encoded bytes embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    /// Encoded PNG/JPEG bytes, as uploaded. Stored in snapshots as base64.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    pub content: String,
    pub font_size: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    pub fill: Color,
    /// In-place editable text (as opposed to a sticker glyph).
    pub editable: bool,
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Rect { width: f32, height: f32 },
    Circle { radius: f32 },
    Triangle { width: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeObject {
    pub shape: ShapeKind,
    pub fill: Color,
}

/// A free-drawn stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathObject {
    /// Relative to the object's `left`/`top`.
    pub points: Vec<Point>,
    pub stroke: Color,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Image(ImageObject),
    Text(TextObject),
    Shape(ShapeObject),
    Path(PathObject),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub left: f32,
    pub top: f32,
    /// Rotation in degrees.
    #[serde(default)]
    pub angle: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub origin: Origin,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

fn default_scale() -> f32 {
    1.0
}

/// Decode embedded image bytes and return their pixel dimensions.
pub fn decode_image(data: &[u8]) -> Result<(u32, u32), SceneError> {
    let decoded = image::load_from_memory(data)?;
    let size = (decoded.width(), decoded.height());
    trace!(bytes = data.len(), width = size.0, height = size.1, "image decoded");
    Ok(size)
}

impl SceneObject {
    pub fn new(kind: ObjectKind, left: f32, top: f32) -> Self {
        Self {
            id: ObjectId::new(),
            left,
            top,
            angle: 0.0,
            scale: 1.0,
            origin: Origin::TopLeft,
            kind,
        }
    }

    /// Build an image object from uploaded bytes. Fails if they don't decode.
    pub fn image(data: Vec<u8>) -> Result<Self, SceneError> {
        let (width, height) = decode_image(&data)?;
        debug!(width, height, "image object created");
        Ok(Self::new(
            ObjectKind::Image(ImageObject {
                data,
                width,
                height,
                filters: Vec::new(),
            }),
            0.0,
            0.0,
        ))
    }

    pub fn text(content: impl Into<String>, font_size: f32, fill: Color) -> Self {
        Self::new(
            ObjectKind::Text(TextObject {
                content: content.into(),
                font_size,
                font_family: default_font_family(),
                fill,
                editable: true,
            }),
            0.0,
            0.0,
        )
    }

    /// A non-editable glyph, e.g. an emoji sticker.
    pub fn sticker(glyph: impl Into<String>, font_size: f32) -> Self {
        let mut sticker = Self::text(glyph, font_size, Color::BLACK);
        if let ObjectKind::Text(t) = &mut sticker.kind {
            t.editable = false;
        }
        sticker
    }

    pub fn shape(shape: ShapeKind, fill: Color) -> Self {
        Self::new(ObjectKind::Shape(ShapeObject { shape, fill }), 0.0, 0.0)
    }

    /// A stroke from absolute canvas points. The object sits at the top-left
    /// of their bounding box and keeps the points relative to it.
    pub fn path(points: Vec<Point>, stroke: Color, width: f32) -> Self {
        let left = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let top = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let (left, top) = if points.is_empty() {
            (0.0, 0.0)
        } else {
            (left, top)
        };
        let points = points
            .into_iter()
            .map(|p| Point::new(p.x - left, p.y - top))
            .collect();
        Self::new(
            ObjectKind::Path(PathObject {
                points,
                stroke,
                width,
            }),
            left,
            top,
        )
    }

    pub fn at(mut self, left: f32, top: f32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ObjectKind::Image(_) => "image",
            ObjectKind::Text(t) if t.editable => "i-text",
            ObjectKind::Text(_) => "text",
            ObjectKind::Shape(s) => match s.shape {
                ShapeKind::Rect { .. } => "rect",
                ShapeKind::Circle { .. } => "circle",
                ShapeKind::Triangle { .. } => "triangle",
            },
            ObjectKind::Path(_) => "path",
        }
    }

    /// Whether every coordinate and size is a finite number. JSON cannot
    /// carry NaN or infinity, so a snapshot is only taken of finite objects.
    pub fn is_finite(&self) -> bool {
        let kind = match &self.kind {
            ObjectKind::Image(_) => true,
            ObjectKind::Text(t) => t.font_size.is_finite(),
            ObjectKind::Shape(s) => match s.shape {
                ShapeKind::Rect { width, height } | ShapeKind::Triangle { width, height } => {
                    width.is_finite() && height.is_finite()
                }
                ShapeKind::Circle { radius } => radius.is_finite(),
            },
            ObjectKind::Path(p) => {
                p.width.is_finite()
                    && p.points
                        .iter()
                        .all(|pt| pt.x.is_finite() && pt.y.is_finite())
            }
        };
        kind && [self.left, self.top, self.angle, self.scale]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }

    /// Unscaled width and height.
    pub fn intrinsic_size(&self) -> (f32, f32) {
        match &self.kind {
            ObjectKind::Image(img) => (img.width as f32, img.height as f32),
            ObjectKind::Text(t) => {
                let lines = t.content.lines().count().max(1);
                let widest = t
                    .content
                    .lines()
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0);
                (
                    widest as f32 * t.font_size * GLYPH_ADVANCE,
                    lines as f32 * t.font_size * LINE_HEIGHT,
                )
            }
            ObjectKind::Shape(s) => match s.shape {
                ShapeKind::Rect { width, height } | ShapeKind::Triangle { width, height } => {
                    (width, height)
                }
                ShapeKind::Circle { radius } => (radius * 2.0, radius * 2.0),
            },
            ObjectKind::Path(p) => p.points.iter().fold((0.0, 0.0), |(w, h), pt| {
                (f32::max(w, pt.x), f32::max(h, pt.y))
            }),
        }
    }

    /// Axis-aligned bounds before rotation.
    pub fn bounds(&self) -> Bounds {
        let (w, h) = self.intrinsic_size();
        let (w, h) = (w * self.scale, h * self.scale);
        let (x, y) = match self.origin {
            Origin::TopLeft => (self.left, self.top),
            Origin::Center => (self.left - w / 2.0, self.top - h / 2.0),
        };
        Bounds {
            x,
            y,
            width: w,
            height: h,
        }
    }
}
