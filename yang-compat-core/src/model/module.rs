use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use super::node::SchemaNode;
use super::path::SchemaPath;
use super::types::TypeDef;

/// A YANG revision date (`YYYY-MM-DD`). Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision {
    year: u16,
    month: u8,
    day: u8,
}

impl Revision {
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(Self { year, month, day })
    }
}

/// Returned when a revision date is not in `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid revision date '{0}'")]
pub struct InvalidRevision(pub String);

impl FromStr for Revision {
    type Err = InvalidRevision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRevision(s.to_string());
        let trimmed = s.trim();
        let mut parts = trimmed.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        let day = day.parse().map_err(|_| invalid())?;
        Revision::new(year, month, day).ok_or_else(invalid)
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A qualified name: module namespace, optional module revision and local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QName {
    pub namespace: String,
    pub revision: Option<Revision>,
    pub local_name: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            revision: None,
            local_name: local_name.into(),
        }
    }

    pub fn with_revision(mut self, revision: Option<Revision>) -> Self {
        self.revision = revision;
        self
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(rev) => write!(f, "({}?revision={}){}", self.namespace, rev, self.local_name),
            None => write!(f, "({}){}", self.namespace, self.local_name),
        }
    }
}

/// Lifecycle status of a definition. `Current < Deprecated < Obsolete`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Current,
    Deprecated,
    Obsolete,
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "current" => Ok(Status::Current),
            "deprecated" => Ok(Status::Deprecated),
            "obsolete" => Ok(Status::Obsolete),
            other => Err(other.to_string()),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Current => "current",
            Status::Deprecated => "deprecated",
            Status::Obsolete => "obsolete",
        })
    }
}

/// An `identity` definition and the identities it derives from.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub qname: QName,
    pub bases: Vec<QName>,
    pub status: Status,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl Identity {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            bases: Vec::new(),
            status: Status::Current,
            description: None,
            reference: None,
        }
    }
}

/// A top-level `augment`: nodes injected at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Augmentation {
    pub target: SchemaPath,
    pub when: Option<String>,
    pub status: Status,
    pub children: Vec<SchemaNode>,
}

/// A fully resolved module, as consumed by [`crate::check::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleModel {
    pub name: String,
    pub namespace: String,
    pub prefix: String,
    /// Most recent revision, if any revision statement exists.
    pub revision: Option<Revision>,
    /// Every revision statement, in declaration order.
    pub revisions: Vec<Revision>,
    pub children: Vec<SchemaNode>,
    pub rpcs: Vec<SchemaNode>,
    pub notifications: Vec<SchemaNode>,
    pub augmentations: Vec<Augmentation>,
    pub typedefs: Vec<TypeDef>,
    pub identities: Vec<Identity>,
}

impl ModuleModel {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            prefix: name.clone(),
            name,
            namespace: namespace.into(),
            revision: None,
            revisions: Vec::new(),
            children: Vec::new(),
            rpcs: Vec::new(),
            notifications: Vec::new(),
            augmentations: Vec::new(),
            typedefs: Vec::new(),
            identities: Vec::new(),
        }
    }

    /// Qualified name of a definition owned by this module.
    pub fn qname(&self, local_name: impl Into<String>) -> QName {
        QName::new(self.namespace.clone(), local_name).with_revision(self.revision)
    }

    /// Resolve an absolute path against the data tree, matching each step by
    /// local name.
    pub fn find_node(&self, path: &SchemaPath) -> Option<&SchemaNode> {
        let mut names = path.local_names();
        let first = names.next()?;
        let mut current = find_by_local_name(&self.children, first)?;
        for name in names {
            current = current.find_child(name)?;
        }
        Some(current)
    }

    pub fn find_rpc(&self, local_name: &str) -> Option<&SchemaNode> {
        find_by_local_name(&self.rpcs, local_name)
    }

    pub fn find_notification(&self, local_name: &str) -> Option<&SchemaNode> {
        find_by_local_name(&self.notifications, local_name)
    }

    pub fn find_augmentation(&self, target: &SchemaPath) -> Option<&Augmentation> {
        self.augmentations.iter().find(|aug| &aug.target == target)
    }

    pub fn find_typedef(&self, local_name: &str) -> Option<&TypeDef> {
        self.typedefs
            .iter()
            .find(|td| td.qname.local_name == local_name)
    }

    pub fn find_identity(&self, local_name: &str) -> Option<&Identity> {
        self.identities
            .iter()
            .find(|id| id.qname.local_name == local_name)
    }
}

/// Find a node among siblings by local name.
pub fn find_by_local_name<'a>(nodes: &'a [SchemaNode], local_name: &str) -> Option<&'a SchemaNode> {
    nodes.iter().find(|node| node.qname.local_name == local_name)
}

#[cfg(test)]
mod tests {
    use super::{ModuleModel, Revision, Status};
    use crate::model::{NodeKind, PathSegment, SchemaNode, SchemaPath};

    #[test]
    fn revision_parses_and_orders_chronologically() {
        let older: Revision = "2019-12-31".parse().expect("valid");
        let newer: Revision = "2020-01-01".parse().expect("valid");
        assert!(older < newer);
        assert_eq!(newer.to_string(), "2020-01-01");
        assert!("2020-1-01".parse::<Revision>().is_err());
        assert!("2020-13-01".parse::<Revision>().is_err());
    }

    #[test]
    fn status_order_is_lifecycle_order() {
        assert!(Status::Current < Status::Deprecated);
        assert!(Status::Deprecated < Status::Obsolete);
    }

    #[test]
    fn find_node_descends_by_local_name() {
        let mut module = ModuleModel::new("m", "urn:m");
        let mut system = SchemaNode::new(NodeKind::Container, module.qname("system"));
        system
            .children
            .push(SchemaNode::new(NodeKind::Leaf, module.qname("hostname")));
        module.children.push(system);

        let path = SchemaPath::root()
            .child(PathSegment::new("other-name", "system"))
            .child(PathSegment::new("other-name", "hostname"));
        let found = module.find_node(&path).expect("node");
        assert_eq!(found.qname.local_name, "hostname");

        let missing = SchemaPath::root().child(PathSegment::new("m", "interfaces"));
        assert!(module.find_node(&missing).is_none());
    }
}
