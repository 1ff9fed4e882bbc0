// Display list produced by rendering the document.

use crate::{Color, Filter, ObjectId, ObjectKind, SceneObject};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One object as the renderer should draw it, in stacking order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: ObjectId,
    pub kind: &'static str,
    pub bounds: Bounds,
    pub angle: f32,
    pub filters: Vec<Filter>,
    pub selected: bool,
}

/// Everything a rasterizer needs to paint the canvas once.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub items: Vec<DrawItem>,
}

impl Frame {
    pub fn empty(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            items: Vec::new(),
        }
    }

    pub(crate) fn item(object: &SceneObject, selected: bool) -> DrawItem {
        let filters = match &object.kind {
            ObjectKind::Image(img) => img.filters.clone(),
            _ => Vec::new(),
        };
        DrawItem {
            id: object.id,
            kind: object.kind_name(),
            bounds: object.bounds(),
            angle: object.angle,
            filters,
            selected,
        }
    }

    /// Whether a selection handle would be painted.
    pub fn has_selection(&self) -> bool {
        self.items.iter().any(|i| i.selected)
    }
}
