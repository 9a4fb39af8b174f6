use crate::model::{PathSegment, SchemaPath};

/// Paired old/new cursors locating the node pair currently being compared.
///
/// Entering a child returns a new tracker; the parent is unchanged, so
/// there is nothing to pop when a branch returns early.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTracker {
    old: SchemaPath,
    new: SchemaPath,
}

impl PathTracker {
    pub fn root() -> Self {
        Self::default()
    }

    /// Start from explicit paths, e.g. an augment target on each side.
    pub fn at(old: SchemaPath, new: SchemaPath) -> Self {
        Self { old, new }
    }

    pub fn enter(&self, old: PathSegment, new: PathSegment) -> Self {
        Self {
            old: self.old.child(old),
            new: self.new.child(new),
        }
    }

    pub fn old(&self) -> &SchemaPath {
        &self.old
    }

    pub fn new_path(&self) -> &SchemaPath {
        &self.new
    }
}
