// Editing tools for the document scene.
// Each tool mutates the scene and then pumps, so every user action is one undo step.

use studio_history::{MutationSource, Recorded};
use studio_scene::{
    Color, DocumentScene, Filter, ObjectId, ObjectKind, Origin, Point, SceneError, SceneObject,
    ShapeKind,
};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::{CanvasConfig, Editor, EditorConfig, Notice};

/// Share of the canvas width an uploaded image is scaled to.
const UPLOAD_WIDTH_RATIO: f32 = 0.8;
const TEXT_SIZE: f32 = 30.0;
const STICKER_SIZE: f32 = 80.0;
const TEMPLATE_TEXT_SIZE: f32 = 40.0;
const SHAPE_ORIGIN: (f32, f32) = (100.0, 100.0);

/// Where a new text box comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPreset {
    /// Header button: "New Text", centered on the canvas.
    Header,
    /// Text panel button: "Heading" near the top-left corner.
    Sidebar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTool {
    Rect,
    Circle,
    Triangle,
}

impl ShapeTool {
    fn shape(self) -> ShapeKind {
        match self {
            ShapeTool::Rect => ShapeKind::Rect {
                width: 80.0,
                height: 80.0,
            },
            ShapeTool::Circle => ShapeKind::Circle { radius: 50.0 },
            ShapeTool::Triangle => ShapeKind::Triangle {
                width: 80.0,
                height: 80.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Color,
    pub width: f32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5.0,
        }
    }
}

/// Tool settings that live outside the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolState {
    pub shape_color: Color,
    pub brush: Brush,
    pub drawing: bool,
    pub canvas: CanvasConfig,
}

/// Which property controls the UI should show for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPanel {
    pub text_controls: bool,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("scene: {0}")]
    Scene(#[from] SceneError),

    #[error("no image is selected")]
    NoImageSelected,

    #[error("drawing mode is off")]
    NotDrawing,

    #[error("a stroke needs at least one point")]
    EmptyStroke,

    #[error("stroke points and width must be finite")]
    NonFiniteStroke,
}

impl Editor<DocumentScene> {
    /// Open a session sized for a viewport of `viewport_width` pixels.
    pub fn open(config: &EditorConfig, viewport_width: u32) -> Result<(Self, ToolState), ToolError> {
        let (width, height) = config.canvas.initial_size(viewport_width);
        let scene = DocumentScene::new(width, height, config.canvas.background)?;
        let editor = Editor::new(scene, config.history.clone())?;

        let tools = ToolState {
            shape_color: Color::BLACK,
            brush: Brush::default(),
            drawing: false,
            canvas: config.canvas.clone(),
        };
        Ok((editor, tools))
    }

    /// Place an uploaded image at 80% of the canvas width, centered and selected.
    pub fn upload_image(&mut self, bytes: Vec<u8>) -> Result<ObjectId, ToolError> {
        let image = match SceneObject::image(bytes) {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, "upload rejected");
                self.notify(Notice::warning("That file could not be read as an image."));
                return Err(err.into());
            }
        };

        let target_width = self.scene.width() as f32 * UPLOAD_WIDTH_RATIO;
        let id = self.scene.add(image);
        self.scene.scale_to_width(id, target_width)?;
        self.scene.center_object(id)?;
        self.scene.set_active(id)?;
        info!(%id, target_width, "image uploaded");
        self.pump();
        Ok(id)
    }

    pub fn add_text(&mut self, preset: TextPreset) -> ObjectId {
        let text = match preset {
            TextPreset::Header => SceneObject::text("New Text", TEXT_SIZE, Color::BLACK)
                .at(
                    self.scene.width() as f32 / 2.0,
                    self.scene.height() as f32 / 2.0,
                )
                .with_origin(Origin::Center),
            TextPreset::Sidebar => {
                SceneObject::text("Heading", TEXT_SIZE, Color::BLACK).at(50.0, 50.0)
            }
        };
        self.add_selected(text)
    }

    pub fn add_sticker(&mut self, glyph: &str) -> ObjectId {
        let sticker = SceneObject::sticker(glyph, STICKER_SIZE).at(
            self.scene.width() as f32 / 2.0,
            self.scene.height() as f32 / 2.0,
        );
        self.add_selected(sticker)
    }

    fn add_selected(&mut self, object: SceneObject) -> ObjectId {
        let id = self.scene.add(object);
        if let Err(err) = self.scene.set_active(id) {
            warn!(error = %err, "new object could not be selected");
        }
        info!(%id, "object added");
        self.pump();
        id
    }

    /// Add a shape filled with the current shape color. Shapes are not selected.
    pub fn add_shape(&mut self, tools: &ToolState, tool: ShapeTool) -> ObjectId {
        let shape =
            SceneObject::shape(tool.shape(), tools.shape_color).at(SHAPE_ORIGIN.0, SHAPE_ORIGIN.1);
        let id = self.scene.add(shape);
        info!(%id, ?tool, "shape added");
        self.pump();
        id
    }

    /// Select an object. Selection is not an undo step.
    pub fn select(&mut self, id: ObjectId) -> Result<(), ToolError> {
        self.scene.set_active(id)?;
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.scene.discard_active();
    }

    pub fn selection_panel(&self) -> SelectionPanel {
        SelectionPanel {
            text_controls: self
                .scene
                .active()
                .is_some_and(|o| o.kind_name() == "i-text"),
        }
    }

    /// Change the shape color and recolor the selected shape, if any.
    pub fn set_shape_color(&mut self, tools: &mut ToolState, color: Color) -> bool {
        tools.shape_color = color;
        self.edit_active("shape fill", |obj| match &mut obj.kind {
            ObjectKind::Shape(shape) => {
                shape.fill = color;
                true
            }
            _ => false,
        })
    }

    /// Recolor the selected editable text.
    pub fn set_text_color(&mut self, color: Color) -> bool {
        self.edit_active("text fill", |obj| match &mut obj.kind {
            ObjectKind::Text(text) if text.editable => {
                text.fill = color;
                true
            }
            _ => false,
        })
    }

    pub fn set_font_family(&mut self, family: &str) -> bool {
        self.edit_active("font family", |obj| match &mut obj.kind {
            ObjectKind::Text(text) if text.editable => {
                text.font_family = family.to_string();
                true
            }
            _ => false,
        })
    }

    /// Turn the selected object a quarter clockwise.
    pub fn rotate_active(&mut self) -> bool {
        self.edit_active("rotate", |obj| {
            obj.angle = (obj.angle + 90.0) % 360.0;
            true
        })
    }

    /// Apply `edit` to the active object if it reports the edit applies.
    fn edit_active<F>(&mut self, what: &str, edit: F) -> bool
    where
        F: FnOnce(&mut SceneObject) -> bool,
    {
        let Some(id) = self.scene.active_id() else {
            trace!(what, "no selection, edit skipped");
            return false;
        };
        let Some(mut edited) = self.scene.object(id).cloned() else {
            return false;
        };
        if !edit(&mut edited) {
            trace!(%id, what, "edit does not apply to selection");
            return false;
        }

        if let Err(err) = self.scene.modify(id, |obj| *obj = edited) {
            warn!(%id, what, error = %err, "edit failed");
            return false;
        }
        debug!(%id, what, "active object edited");
        self.pump();
        true
    }

    /// Shrink the canvas to a square of its shorter side.
    pub fn crop_to_square(&mut self) -> Result<u32, ToolError> {
        let size = self.scene.width().min(self.scene.height());
        self.scene.set_dimensions(size, size)?;
        info!(size, "canvas cropped to square");
        self.pump();
        self.notify(Notice::info("Canvas cropped to square!"));
        Ok(size)
    }

    /// Replace the selected image's filters with `filter`.
    pub fn apply_filter(&mut self, filter: Filter) -> Result<(), ToolError> {
        let is_image = self
            .scene
            .active()
            .is_some_and(|o| matches!(o.kind, ObjectKind::Image(_)));
        if !is_image {
            self.notify(Notice::warning("Select an image first!"));
            return Err(ToolError::NoImageSelected);
        }

        self.edit_active("filter", |obj| match &mut obj.kind {
            ObjectKind::Image(img) => {
                img.filters = vec![filter];
                true
            }
            _ => false,
        });
        Ok(())
    }

    /// Start over from a template: blank white canvas with its title.
    pub fn apply_template(&mut self, name: &str) -> ObjectId {
        self.scene.clear();
        self.scene.set_background(Color::WHITE);
        let title = SceneObject::text(name, TEMPLATE_TEXT_SIZE, Color::BLACK)
            .at(
                self.scene.width() as f32 / 2.0,
                self.scene.height() as f32 / 2.0,
            )
            .with_origin(Origin::Center);
        let id = self.scene.add(title);
        info!(template = name, "template applied");
        self.pump();
        id
    }

    /// Flip free drawing. Returns the new state.
    pub fn toggle_drawing(&mut self, tools: &mut ToolState) -> bool {
        tools.drawing = !tools.drawing;
        info!(drawing = tools.drawing, "drawing mode toggled");
        tools.drawing
    }

    /// Turn a finished brush stroke into a path object.
    pub fn draw_stroke(
        &mut self,
        tools: &ToolState,
        points: Vec<Point>,
    ) -> Result<ObjectId, ToolError> {
        if !tools.drawing {
            return Err(ToolError::NotDrawing);
        }
        if points.is_empty() {
            return Err(ToolError::EmptyStroke);
        }

        let stroke = SceneObject::path(points, tools.brush.color, tools.brush.width);
        if !stroke.is_finite() {
            warn!("stroke with non-finite geometry rejected");
            return Err(ToolError::NonFiniteStroke);
        }
        let id = self.scene.add(stroke);
        debug!(%id, "stroke committed");
        self.pump();
        Ok(id)
    }

    /// Drag the selected object. Only the final position is recorded, and a
    /// drag that ends where it started records nothing.
    pub fn drag_active(&mut self, steps: &[(f32, f32)]) -> Result<bool, ToolError> {
        let Some((id, start)) = self.scene.active().map(|o| (o.id, (o.left, o.top))) else {
            return Ok(false);
        };

        self.begin_gesture();
        let mut dragged = Ok(());
        for &(dx, dy) in steps {
            if let Err(err) = self.scene.nudge(id, dx, dy) {
                dragged = Err(err);
                break;
            }
            self.pump();
        }
        let moved = self
            .scene
            .object(id)
            .is_some_and(|o| (o.left, o.top) != start);
        let dragged = match dragged {
            Ok(()) if moved => self.scene.settle(id),
            other => other,
        };
        let recorded = self.end_gesture();
        dragged?;

        debug!(%id, frames = steps.len(), ?recorded, "drag finished");
        Ok(matches!(recorded, Some(Recorded::Appended { .. })))
    }

    /// Follow the container size on narrow screens. Not an undo step.
    pub fn viewport_resized(&mut self, tools: &ToolState, container_width: u32) -> bool {
        let Some((width, height)) = tools.canvas.resized_size(container_width) else {
            return false;
        };

        self.pump();
        if let Err(err) = self.scene.set_dimensions(width, height) {
            warn!(error = %err, "viewport resize ignored");
            return false;
        }
        let dropped = self.scene.take_mutations();
        trace!(width, height, dropped = dropped.len(), "canvas follows viewport");
        true
    }
}
