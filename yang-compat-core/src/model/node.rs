use std::fmt::{self, Display, Formatter};

use super::module::{find_by_local_name, QName, Status};
use super::types::TypeDef;

/// Which YANG statement produced a [`SchemaNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container,
    List,
    Leaf,
    LeafList,
    Choice,
    Case,
    Anydata,
    Anyxml,
    Rpc,
    Input,
    Output,
    Action,
    Notification,
}

impl NodeKind {
    /// The YANG keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::List => "list",
            NodeKind::Leaf => "leaf",
            NodeKind::LeafList => "leaf-list",
            NodeKind::Choice => "choice",
            NodeKind::Case => "case",
            NodeKind::Anydata => "anydata",
            NodeKind::Anyxml => "anyxml",
            NodeKind::Rpc => "rpc",
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::Action => "action",
            NodeKind::Notification => "notification",
        }
    }

    /// Kinds that accept a `mandatory` statement.
    pub fn is_mandatory_aware(self) -> bool {
        matches!(
            self,
            NodeKind::Leaf | NodeKind::Choice | NodeKind::Anydata | NodeKind::Anyxml
        )
    }

    /// Kinds that accept `min-elements` / `max-elements`.
    pub fn is_element_counted(self) -> bool {
        matches!(self, NodeKind::List | NodeKind::LeafList)
    }

    /// Kinds that carry a `type`.
    pub fn is_typed(self) -> bool {
        matches!(self, NodeKind::Leaf | NodeKind::LeafList)
    }

    /// Kinds that are part of the configuration/state data tree.
    pub fn is_data(self) -> bool {
        matches!(
            self,
            NodeKind::Container
                | NodeKind::List
                | NodeKind::Leaf
                | NodeKind::LeafList
                | NodeKind::Choice
                | NodeKind::Case
                | NodeKind::Anydata
                | NodeKind::Anyxml
        )
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// `min-elements` / `max-elements` of a list or leaf-list. Each bound is
/// `None` when the statement is absent; `max-elements unbounded` is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ElementCountConstraint {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// A `must` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MustConstraint {
    pub xpath: String,
    pub error_message: Option<String>,
    pub error_app_tag: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl MustConstraint {
    pub fn new(xpath: impl Into<String>) -> Self {
        Self {
            xpath: xpath.into(),
            error_message: None,
            error_app_tag: None,
            description: None,
            reference: None,
        }
    }
}

impl Display for MustConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xpath)
    }
}

/// One node of a resolved schema tree.
///
/// Capability-specific data lives in optional fields rather than in separate
/// node types: `mandatory` is only set for mandatory-aware kinds,
/// `element_count` only for lists and leaf-lists, `type_def` only for leafs
/// and leaf-lists, and `config` only for data nodes outside operations.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: NodeKind,
    pub qname: QName,
    pub status: Status,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub config: Option<bool>,
    pub mandatory: Option<bool>,
    pub element_count: Option<ElementCountConstraint>,
    pub musts: Vec<MustConstraint>,
    pub when: Option<String>,
    pub children: Vec<SchemaNode>,
    pub type_def: Option<TypeDef>,
}

impl SchemaNode {
    pub fn new(kind: NodeKind, qname: QName) -> Self {
        Self {
            kind,
            qname,
            status: Status::Current,
            description: None,
            reference: None,
            config: None,
            mandatory: None,
            element_count: None,
            musts: Vec::new(),
            when: None,
            children: Vec::new(),
            type_def: None,
        }
    }

    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory == Some(true)
    }

    pub fn find_child(&self, local_name: &str) -> Option<&SchemaNode> {
        find_by_local_name(&self.children, local_name)
    }
}
