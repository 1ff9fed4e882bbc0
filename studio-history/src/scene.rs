// The seam between the history and whatever document it tracks.

use crate::Snapshot;

/// A mutable, serializable document the history can capture and restore.
///
/// Implementations are driven from a single UI thread, so `restore` does not
/// need to be `Send`.
#[allow(async_fn_in_trait)]
pub trait Scene {
    type Error: std::error::Error + 'static;

    /// Capture the whole scene. Must not have user-visible side effects.
    fn serialize(&self) -> Result<Snapshot, Self::Error>;

    /// Replace the scene with the state captured in `snapshot`.
    ///
    /// Completion means the scene is safe to render. On error the scene must
    /// be left as it was before the call.
    async fn restore(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;

    /// Draw the current state. Idempotent.
    fn render(&mut self);
}

/// A scene-side change notification.
pub trait Mutation: std::fmt::Debug {
    /// False for intermediate frames of a continuous gesture.
    fn is_committed(&self) -> bool;
}

/// The channel a scene emits mutation notifications on.
///
/// Notifications are queued in delivery order and handed over in bulk.
pub trait MutationSource {
    type Event: Mutation;

    fn take_mutations(&mut self) -> Vec<Self::Event>;
}
