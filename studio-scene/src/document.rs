//! The document and the scene wrapper the editor mutates.

use serde::{Deserialize, Serialize};
use studio_history::{MutationSource, Scene, Snapshot};
use tracing::{debug, info, trace, warn};

use crate::{
    decode_image, Color, Frame, ObjectId, ObjectKind, Origin, SceneError, SceneEvent, SceneObject,
};

/// Bumped whenever the snapshot layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything that is captured by a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// Bottom to top.
    pub objects: Vec<SceneObject>,
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    #[serde(flatten)]
    document: &'a Document,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    #[serde(flatten)]
    document: Document,
}

/// A document plus the transient state around it: the active object,
/// queued notifications and the last rendered frame.
#[derive(Debug)]
pub struct DocumentScene {
    document: Document,
    active: Option<ObjectId>,
    events: Vec<SceneEvent>,
    frame: Frame,
    renders: u64,
}

impl DocumentScene {
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self, SceneError> {
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidDimensions { width, height });
        }

        info!(width, height, background = %background.to_hex(), "creating scene");
        Ok(Self {
            document: Document {
                width,
                height,
                background,
                objects: Vec::new(),
            },
            active: None,
            events: Vec::new(),
            frame: Frame::empty(width, height, background),
            renders: 0,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn width(&self) -> u32 {
        self.document.width
    }

    pub fn height(&self) -> u32 {
        self.document.height
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.document.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.document.objects.iter().find(|o| o.id == id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject, SceneError> {
        self.document
            .objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(SceneError::UnknownObject { id })
    }

    /// Put `object` on top of the stack.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        debug!(%id, kind = object.kind_name(), "object added");
        self.document.objects.push(object);
        self.events.push(SceneEvent::ObjectAdded(id));
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Result<SceneObject, SceneError> {
        let index = self
            .document
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(SceneError::UnknownObject { id })?;
        let removed = self.document.objects.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        debug!(%id, "object removed");
        self.events.push(SceneEvent::ObjectRemoved(id));
        Ok(removed)
    }

    pub fn active_id(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn active(&self) -> Option<&SceneObject> {
        self.active.and_then(|id| self.object(id))
    }

    pub fn set_active(&mut self, id: ObjectId) -> Result<(), SceneError> {
        if self.object(id).is_none() {
            warn!(%id, "cannot select unknown object");
            return Err(SceneError::UnknownObject { id });
        }
        trace!(%id, "selection set");
        self.active = Some(id);
        Ok(())
    }

    pub fn discard_active(&mut self) {
        if let Some(id) = self.active.take() {
            trace!(%id, "selection cleared");
        }
    }

    /// Commit an edit to one object.
    pub fn modify<F>(&mut self, id: ObjectId, edit: F) -> Result<(), SceneError>
    where
        F: FnOnce(&mut SceneObject),
    {
        edit(self.object_mut(id)?);
        trace!(%id, "object modified");
        self.events.push(SceneEvent::ObjectModified(id));
        Ok(())
    }

    /// Move an object by one drag frame. Not a committed edit.
    pub fn nudge(&mut self, id: ObjectId, dx: f32, dy: f32) -> Result<(), SceneError> {
        if !dx.is_finite() || !dy.is_finite() {
            warn!(%id, dx, dy, "non-finite drag offset ignored");
            return Err(SceneError::NonFiniteOffset { dx, dy });
        }
        let object = self.object_mut(id)?;
        object.left += dx;
        object.top += dy;
        self.events.push(SceneEvent::ObjectMoving(id));
        Ok(())
    }

    /// Mark the end of a drag on `id`.
    pub fn settle(&mut self, id: ObjectId) -> Result<(), SceneError> {
        self.object_mut(id)?;
        self.events.push(SceneEvent::ObjectModified(id));
        Ok(())
    }

    /// Place the object's center on the canvas center. Does not notify.
    pub fn center_object(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let (cx, cy) = (self.width() as f32 / 2.0, self.height() as f32 / 2.0);
        let object = self.object_mut(id)?;
        object.origin = Origin::Center;
        object.left = cx;
        object.top = cy;
        Ok(())
    }

    /// Uniformly scale the object so it is `width` wide. Does not notify.
    pub fn scale_to_width(&mut self, id: ObjectId, width: f32) -> Result<(), SceneError> {
        let object = self.object_mut(id)?;
        let (intrinsic, _) = object.intrinsic_size();
        if intrinsic > 0.0 {
            object.scale = width / intrinsic;
        }
        Ok(())
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<(), SceneError> {
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidDimensions { width, height });
        }
        debug!(width, height, "canvas resized");
        self.document.width = width;
        self.document.height = height;
        self.events.push(SceneEvent::CanvasResized { width, height });
        Ok(())
    }

    pub fn set_background(&mut self, color: Color) {
        self.document.background = color;
        self.events.push(SceneEvent::BackgroundChanged);
    }

    /// Remove every object. Dimensions and background stay.
    pub fn clear(&mut self) {
        debug!(removed = self.document.objects.len(), "scene cleared");
        self.document.objects.clear();
        self.active = None;
        self.events.push(SceneEvent::Cleared);
    }

    /// The frame produced by the last `render()`.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Check every embedded image before a snapshot is swapped in.
    fn verify_images(document: &Document) -> Result<(), SceneError> {
        for object in &document.objects {
            if let ObjectKind::Image(img) = &object.kind {
                let found = decode_image(&img.data)?;
                let expected = (img.width, img.height);
                if found != expected {
                    return Err(SceneError::ImageSizeMismatch {
                        id: object.id,
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Scene for DocumentScene {
    type Error = SceneError;

    fn serialize(&self) -> Result<Snapshot, SceneError> {
        if let Some(bad) = self.document.objects.iter().find(|o| !o.is_finite()) {
            return Err(SceneError::NonFiniteGeometry { id: bad.id });
        }
        let json = serde_json::to_string(&SnapshotOut {
            version: SNAPSHOT_VERSION,
            document: &self.document,
        })?;
        trace!(bytes = json.len(), "scene serialized");
        Ok(Snapshot::new(json))
    }

    async fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SceneError> {
        let parsed: SnapshotIn = serde_json::from_str(snapshot.as_str())?;
        if parsed.version != SNAPSHOT_VERSION {
            return Err(SceneError::UnsupportedVersion {
                found: parsed.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Self::verify_images(&parsed.document)?;

        self.document = parsed.document;
        self.active = None;
        // Loading re-adds every object, and says so.
        self.events.extend(
            self.document
                .objects
                .iter()
                .map(|o| SceneEvent::ObjectAdded(o.id)),
        );

        debug!(
            objects = self.document.objects.len(),
            width = self.document.width,
            height = self.document.height,
            "scene restored"
        );
        Ok(())
    }

    fn render(&mut self) {
        let active = self.active;
        self.frame = Frame {
            width: self.document.width,
            height: self.document.height,
            background: self.document.background,
            items: self
                .document
                .objects
                .iter()
                .map(|o| Frame::item(o, Some(o.id) == active))
                .collect(),
        };
        self.renders += 1;
        trace!(items = self.frame.items.len(), "frame rendered");
    }
}

impl MutationSource for DocumentScene {
    type Event = SceneEvent;

    fn take_mutations(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShapeKind;

    fn scene() -> DocumentScene {
        DocumentScene::new(600, 780, Color::WHITE).unwrap()
    }

    fn rect() -> SceneObject {
        SceneObject::shape(
            ShapeKind::Rect {
                width: 80.0,
                height: 80.0,
            },
            Color::rgb(255, 0, 0),
        )
        .at(100.0, 100.0)
    }

    #[test]
    fn test_zero_sized_canvas_rejected() {
        assert!(DocumentScene::new(0, 10, Color::WHITE).is_err());
        assert!(scene().set_dimensions(10, 0).is_err());
    }

    #[test]
    fn test_mutations_are_queued_in_order() {
        let mut s = scene();
        let id = s.add(rect());
        s.nudge(id, 5.0, 0.0).unwrap();
        s.settle(id).unwrap();
        s.set_dimensions(600, 600).unwrap();

        let events = s.take_mutations();
        assert_eq!(
            events,
            vec![
                SceneEvent::ObjectAdded(id),
                SceneEvent::ObjectMoving(id),
                SceneEvent::ObjectModified(id),
                SceneEvent::CanvasResized {
                    width: 600,
                    height: 600
                },
            ]
        );
        assert!(s.take_mutations().is_empty());
    }

    #[test]
    fn test_modify_unknown_object_fails() {
        let mut s = scene();
        let err = s.modify(ObjectId::new(), |o| o.angle = 90.0).unwrap_err();
        assert!(matches!(err, SceneError::UnknownObject { .. }));
        assert!(s.take_mutations().is_empty());
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut s = scene();
        let id = s.add(rect());
        s.set_active(id).unwrap();
        s.remove(id).unwrap();
        assert!(s.active().is_none());
        assert!(s.objects().is_empty());
    }

    #[test]
    fn test_selection_is_not_serialized() {
        let mut s = scene();
        let id = s.add(rect());
        let before = s.serialize().unwrap();
        s.set_active(id).unwrap();
        assert_eq!(s.serialize().unwrap(), before);
    }

    #[test]
    fn test_restore_swaps_document_and_announces_objects() {
        let mut s = scene();
        let id = s.add(rect());
        let with_rect = s.serialize().unwrap();
        let other = s.add(rect());
        s.set_active(other).unwrap();
        s.take_mutations();

        pollster::block_on(s.restore(&with_rect)).unwrap();
        assert_eq!(s.objects().len(), 1);
        assert!(s.active().is_none());
        assert_eq!(s.take_mutations(), vec![SceneEvent::ObjectAdded(id)]);
        assert_eq!(s.serialize().unwrap(), with_rect);
    }

    #[test]
    fn test_failed_restore_leaves_scene_untouched() {
        let mut s = scene();
        s.add(rect());
        let before = s.serialize().unwrap();
        s.take_mutations();

        let bad = Snapshot::new("{\"version\":1,\"width\":5}");
        assert!(pollster::block_on(s.restore(&bad)).is_err());
        let future = Snapshot::new(before.as_str().replacen("\"version\":1", "\"version\":9", 1));
        let err = pollster::block_on(s.restore(&future)).unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedVersion { found: 9, .. }));

        assert_eq!(s.serialize().unwrap(), before);
        assert!(s.take_mutations().is_empty());
    }

    #[test]
    fn test_render_marks_selection() {
        let mut s = scene();
        let id = s.add(rect());
        s.render();
        assert!(!s.frame().has_selection());
        s.set_active(id).unwrap();
        s.render();
        assert!(s.frame().has_selection());
        assert_eq!(s.render_count(), 2);
    }

    #[test]
    fn test_center_and_scale_do_not_notify() {
        let mut s = scene();
        let id = s.add(rect());
        s.take_mutations();
        s.scale_to_width(id, 480.0).unwrap();
        s.center_object(id).unwrap();
        assert!(s.take_mutations().is_empty());

        let b = s.object(id).unwrap().bounds();
        assert_eq!(b.width, 480.0);
        assert_eq!(b.x + b.width / 2.0, 300.0);
        assert_eq!(b.y + b.height / 2.0, 390.0);
    }

    #[test]
    fn test_non_finite_geometry_is_never_snapshotted() {
        let mut s = scene();
        let id = s.add(rect());
        let err = s.nudge(id, f32::NAN, 0.0).unwrap_err();
        assert!(matches!(err, SceneError::NonFiniteOffset { .. }));
        assert_eq!(s.object(id).unwrap().left, 100.0);

        s.modify(id, |o| o.angle = f32::INFINITY).unwrap();
        let err = s.serialize().unwrap_err();
        assert!(matches!(err, SceneError::NonFiniteGeometry { id: bad } if bad == id));
    }
}
