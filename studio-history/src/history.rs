// Undo/redo history module for the editor.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::{Scene, Snapshot};

/// Smallest usable cap: the initial snapshot plus one edit.
const MIN_ENTRIES: usize = 2;

/// History tuning. Unlimited by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Upper bound on stored snapshots, initial snapshot included.
    ///
    /// Off by default. When set, this is the one way history shrinks other
    /// than discarding the redo branch: the oldest edit after the initial
    /// snapshot is evicted, so entries leave from the middle of the list.
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<(), HistoryConfigError> {
        match self.max_entries {
            Some(max) if max < MIN_ENTRIES => {
                error!(max_entries = max, "history cap too small");
                Err(HistoryConfigError::CapTooSmall {
                    max,
                    min: MIN_ENTRIES,
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryConfigError {
    #[error("max_entries={max} is below the minimum of {min}")]
    CapTooSmall { max: usize, min: usize },
}

/// Which way a step moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// The two states of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Restoring { direction: Direction, target: usize },
}

/// Why an undo/redo request did nothing. None of these are user errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepRefused {
    #[error("already at the oldest snapshot")]
    AtStart,

    #[error("already at the newest snapshot")]
    AtEnd,

    #[error("a restore is already in flight")]
    Busy,
}

/// Result of a `record()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// A snapshot was appended; `discarded` redo entries were dropped first.
    Appended { cursor: usize, discarded: usize },
    /// A restore was in flight, nothing happened.
    Suppressed,
    /// The scene could not be serialized, history unchanged.
    Failed,
}

/// Result of a full undo/redo step.
#[derive(Debug)]
pub enum StepOutcome<E> {
    Applied { cursor: usize },
    Refused(StepRefused),
    Failed(E),
}

impl<E> StepOutcome<E> {
    pub fn is_applied(&self) -> bool {
        matches!(self, StepOutcome::Applied { .. })
    }
}

/// Exclusive hold on the `Restoring` phase for one step.
///
/// Dropping the guard returns the history to `Idle` whether or not the
/// step was completed.
#[derive(Debug)]
pub struct RestoreGuard {
    phase: Rc<Cell<Phase>>,
    direction: Direction,
    target: usize,
    snapshot: Snapshot,
}

impl RestoreGuard {
    /// The snapshot the scene should be restored to.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        trace!(target_index = self.target, "restore guard released");
        self.phase.set(Phase::Idle);
    }
}

/// Ordered snapshots plus a cursor. The cursor is always a valid index.
#[derive(Debug)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
    phase: Rc<Cell<Phase>>,
    max_entries: Option<usize>,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: Snapshot, config: HistoryConfig) -> Self {
        let max_entries = config.max_entries.map(|max| {
            if max < MIN_ENTRIES {
                warn!(max_entries = max, "history cap raised to minimum");
            }
            max.max(MIN_ENTRIES)
        });

        debug!(
            initial_bytes = initial.len(),
            max_entries = ?max_entries,
            "history created"
        );

        Self {
            entries: vec![initial],
            cursor: 0,
            phase: Rc::new(Cell::new(Phase::Idle)),
            max_entries,
        }
    }

    /// Start a history from the scene's current state.
    pub fn for_scene<S: Scene>(scene: &S, config: HistoryConfig) -> Result<Self, S::Error> {
        Ok(Self::new(scene.serialize()?, config))
    }

    /// Capture the scene after an undo-worthy change.
    ///
    /// While a restore is in flight this is a no-op and the scene is not
    /// serialized.
    pub fn record<S: Scene>(&mut self, scene: &S) -> Recorded {
        if self.is_restoring() {
            debug!(phase = ?self.phase.get(), "restore in flight, recording suppressed");
            return Recorded::Suppressed;
        }

        match scene.serialize() {
            Ok(snapshot) => self.push(snapshot),
            Err(err) => {
                error!(error = %err, "failed to serialize scene, history unchanged");
                Recorded::Failed
            }
        }
    }

    fn push(&mut self, snapshot: Snapshot) -> Recorded {
        let discarded = self.entries.len() - (self.cursor + 1);
        if discarded > 0 {
            debug!(discarded, cursor = self.cursor, "dropping redo branch");
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);

        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                // Index 0 is the blank scene and always survives.
                self.entries.remove(1);
                trace!(max_entries = max, "evicted oldest edit");
            }
        }

        self.cursor = self.entries.len() - 1;
        debug!(
            cursor = self.cursor,
            len = self.entries.len(),
            "snapshot recorded"
        );

        Recorded::Appended {
            cursor: self.cursor,
            discarded,
        }
    }

    pub fn begin_undo(&mut self) -> Result<RestoreGuard, StepRefused> {
        self.begin(Direction::Backward)
    }

    pub fn begin_redo(&mut self) -> Result<RestoreGuard, StepRefused> {
        self.begin(Direction::Forward)
    }

    /// Enter `Restoring` for a step in `direction`.
    ///
    /// Overlapping requests are dropped with `StepRefused::Busy`.
    pub fn begin(&mut self, direction: Direction) -> Result<RestoreGuard, StepRefused> {
        if self.is_restoring() {
            warn!(?direction, "step requested while restoring, dropped");
            return Err(StepRefused::Busy);
        }

        let target = match direction {
            Direction::Backward => self.cursor.checked_sub(1).ok_or(StepRefused::AtStart)?,
            Direction::Forward if self.cursor + 1 < self.entries.len() => self.cursor + 1,
            Direction::Forward => return Err(StepRefused::AtEnd),
        };

        self.phase.set(Phase::Restoring { direction, target });
        debug!(?direction, from = self.cursor, to = target, "restore started");

        Ok(RestoreGuard {
            phase: Rc::clone(&self.phase),
            direction,
            target,
            snapshot: self.entries[target].clone(),
        })
    }

    /// Finish a successful restore: move the cursor and release the guard.
    pub fn complete(&mut self, guard: RestoreGuard) -> usize {
        if !Rc::ptr_eq(&guard.phase, &self.phase) {
            warn!("restore guard belongs to another history, ignored");
            return self.cursor;
        }

        self.cursor = guard.target;
        debug!(cursor = self.cursor, "restore completed");
        self.cursor
    }

    /// Step back one snapshot: restore it, render, then move the cursor.
    pub async fn undo<S: Scene>(&mut self, scene: &mut S) -> StepOutcome<S::Error> {
        self.step(scene, Direction::Backward).await
    }

    /// Step forward one snapshot.
    pub async fn redo<S: Scene>(&mut self, scene: &mut S) -> StepOutcome<S::Error> {
        self.step(scene, Direction::Forward).await
    }

    async fn step<S: Scene>(&mut self, scene: &mut S, direction: Direction) -> StepOutcome<S::Error> {
        let guard = match self.begin(direction) {
            Ok(guard) => guard,
            Err(refused) => {
                debug!(reason = %refused, "step is a no-op");
                return StepOutcome::Refused(refused);
            }
        };

        match scene.restore(guard.snapshot()).await {
            Ok(()) => {
                scene.render();
                StepOutcome::Applied {
                    cursor: self.complete(guard),
                }
            }
            Err(err) => {
                error!(error = %err, target_index = guard.target(), "restore failed");
                drop(guard);
                StepOutcome::Failed(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.is_restoring() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.is_restoring() && self.cursor + 1 < self.entries.len()
    }

    pub fn is_restoring(&self) -> bool {
        matches!(self.phase.get(), Phase::Restoring { .. })
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the initial snapshot is always kept.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }
}
