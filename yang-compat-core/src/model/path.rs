use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// One step of an absolute schema path: the owning module name and the
/// node's local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PathSegment {
    pub module: String,
    pub local: String,
}

impl PathSegment {
    pub fn new(module: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            local: local.into(),
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.local)
    }
}

/// An absolute schema node path, rendered as `/module:node/module:child`.
///
/// Paths are immutable values; [`SchemaPath::child`] returns a new path and
/// leaves the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaPath {
    segments: Vec<PathSegment>,
}

impl SchemaPath {
    /// The empty (root) path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Return a new path extended by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Local names only, used when resolving a path against a schema tree.
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|segment| segment.local.as_str())
    }
}

impl Display for SchemaPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
