// Immutable serialized scene captures.

use std::fmt;
use std::sync::Arc;

/// A serialized capture of an entire scene at one instant.
///
/// Cloning is cheap; the text is shared. Two snapshots are equal when their
/// serialized content is equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    /// Wrap serialized scene text. Only `Scene::serialize` implementations
    /// should call this.
    pub fn new(text: impl Into<String>) -> Self {
        Self(Arc::from(text.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the serialized text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Snapshots embed image bytes; never dump them into logs.
        f.debug_struct("Snapshot").field("bytes", &self.len()).finish()
    }
}
