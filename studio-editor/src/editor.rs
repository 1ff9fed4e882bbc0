//! The editing session: one scene, one history, and the explicit points at
//! which the history records.
//!
//! Recording triggers, in full:
//! - `pump()` after a tool action, once if the action produced any committed
//!   scene notification;
//! - `end_gesture()`, once for a whole drag or color scrub;
//! - `record()`, for changes the scene does not notify about.

use studio_history::{
    Direction, History, HistoryConfig, Mutation, MutationSource, Recorded, Scene,
};
use tracing::{debug, error, info, trace, warn};

use crate::Notice;

#[derive(Debug)]
pub struct Editor<S> {
    pub(crate) scene: S,
    history: History,
    notices: Vec<Notice>,
    gesture_depth: usize,
    gesture_dirty: bool,
}

impl<S> Editor<S>
where
    S: Scene + MutationSource,
{
    /// Start a session. The scene's current state becomes the one snapshot
    /// undo can always return to.
    pub fn new(mut scene: S, config: HistoryConfig) -> Result<Self, S::Error> {
        let pending = scene.take_mutations();
        trace!(discarded = pending.len(), "setup notifications dropped");

        let history = History::for_scene(&scene, config)?;
        info!("editor session started");
        Ok(Self {
            scene,
            history,
            notices: Vec::new(),
            gesture_depth: 0,
            gesture_dirty: false,
        })
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Record the current scene.
    pub fn record(&mut self) -> Recorded {
        self.history.record(&self.scene)
    }

    /// Drain scene notifications and record once if any were committed.
    ///
    /// Inside a gesture the record is deferred to `end_gesture()`.
    pub fn pump(&mut self) -> Option<Recorded> {
        let events = self.scene.take_mutations();
        if events.is_empty() {
            return None;
        }

        let committed = events.iter().filter(|e| e.is_committed()).count();
        trace!(
            events = events.len(),
            committed,
            "scene notifications drained"
        );
        if committed == 0 {
            return None;
        }

        if self.gesture_depth > 0 {
            self.gesture_dirty = true;
            return None;
        }
        Some(self.record())
    }

    /// Start continuous input. Gestures nest.
    pub fn begin_gesture(&mut self) {
        self.pump();
        if self.gesture_depth == 0 {
            self.gesture_dirty = false;
        }
        self.gesture_depth += 1;
        trace!(depth = self.gesture_depth, "gesture started");
    }

    /// Finish continuous input, recording the settled result once.
    pub fn end_gesture(&mut self) -> Option<Recorded> {
        if self.gesture_depth == 0 {
            warn!("end_gesture without begin_gesture");
            return None;
        }

        self.pump();
        self.gesture_depth -= 1;
        if self.gesture_depth > 0 || !self.gesture_dirty {
            return None;
        }
        self.gesture_dirty = false;
        debug!("gesture settled");
        Some(self.record())
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture_depth > 0
    }

    /// Step back one snapshot. Returns whether the scene changed.
    pub async fn undo(&mut self) -> bool {
        self.step(Direction::Backward).await
    }

    /// Step forward one snapshot. Returns whether the scene changed.
    pub async fn redo(&mut self) -> bool {
        self.step(Direction::Forward).await
    }

    async fn step(&mut self, direction: Direction) -> bool {
        if self.in_gesture() {
            warn!(?direction, "step requested mid-gesture, dropped");
            return false;
        }
        // Anything the user did before pressing the button counts first.
        self.pump();

        let guard = match self.history.begin(direction) {
            Ok(guard) => guard,
            Err(refused) => {
                debug!(?direction, reason = %refused, "step is a no-op");
                return false;
            }
        };

        match self.scene.restore(guard.snapshot()).await {
            Ok(()) => {
                // The restore announces every object it loaded; those reach
                // record() while the guard is held and are ignored.
                if let Some(recorded) = self.pump() {
                    trace!(?recorded, "restore notifications swallowed");
                }
                self.scene.render();
                let cursor = self.history.complete(guard);
                info!(?direction, cursor, "history step applied");
                true
            }
            Err(err) => {
                drop(guard);
                let dropped = self.scene.take_mutations();
                error!(
                    ?direction,
                    error = %err,
                    dropped = dropped.len(),
                    "restore failed, scene left as it was"
                );
                self.notices
                    .push(Notice::error(format!("Could not restore that step: {err}")));
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.in_gesture() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.in_gesture() && self.history.can_redo()
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        debug!(level = ?notice.level, message = %notice.message, "notice raised");
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand pending notices to the UI.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
