// Mutation notifications emitted by the document scene.

use studio_history::Mutation;

use crate::ObjectId;

/// One change to the scene, queued in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    ObjectAdded(ObjectId),
    ObjectModified(ObjectId),
    /// Intermediate drag frame; the settled result arrives as `ObjectModified`.
    ObjectMoving(ObjectId),
    ObjectRemoved(ObjectId),
    CanvasResized { width: u32, height: u32 },
    BackgroundChanged,
    Cleared,
}

impl Mutation for SceneEvent {
    fn is_committed(&self) -> bool {
        !matches!(self, SceneEvent::ObjectMoving(_))
    }
}
