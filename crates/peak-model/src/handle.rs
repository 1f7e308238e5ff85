//! Boundary between the engine and the map document it edits.

use serde::{Deserialize, Serialize};

use crate::geo::Point;
use crate::record::Origin;
use crate::tags::Tags;

/// Opaque reference to an element of the map document.
///
/// Handles are created by the document owner; the engine only passes them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalHandle(usize);

impl ExternalHandle {
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

/// Narrow mutation interface implemented by the map document.
pub trait MapDocument {
    /// Adds `key` or overwrites its value.
    fn set_tag(&mut self, handle: ExternalHandle, key: &str, value: &str);

    fn remove_tag(&mut self, handle: ExternalHandle, key: &str);

    /// Flags the element so the writer emits it as changed.
    fn mark_modified(&mut self, handle: ExternalHandle);
}

/// Source record that found no map counterpart and becomes a new map node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedPeak {
    pub origin: Origin,
    pub location: Point,
    pub tags: Tags,
}
