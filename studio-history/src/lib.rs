//! studio-history: snapshot based undo/redo for the studio editor.
//!
//! Design rules:
//! - The history never builds or edits a snapshot; scenes produce them.
//! - The cursor always names the snapshot the scene is currently showing.
//! - Recording is a no-op while a restore is in flight.
//! - A restore is a scoped acquisition: the history returns to idle on
//!   every exit path, including failures and abandoned futures.

pub mod history;
pub mod scene;
pub mod snapshot;

pub use history::{
    Direction, History, HistoryConfig, HistoryConfigError, Phase, Recorded, RestoreGuard,
    StepOutcome, StepRefused,
};
pub use scene::{Mutation, MutationSource, Scene};
pub use snapshot::Snapshot;
