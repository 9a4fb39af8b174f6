use std::collections::BTreeMap;

use serde::Serialize;

/// A generic XML element, as produced by [`crate::parser::parse`].
///
/// Element names are split into an optional prefix and a local tag so YIN
/// statements can be matched regardless of how the document binds the YIN
/// namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlNode {
    /// Local element name (without prefix).
    pub tag: String,
    /// Namespace prefix, if the element name was qualified.
    pub prefix: Option<String>,
    /// XML attributes keyed by name. Namespace declarations are dropped.
    pub attributes: BTreeMap<String, String>,
    /// Child elements.
    pub children: Vec<XmlNode>,
    /// Optional text content.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create a new element with no attributes, children, or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            prefix: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Return all children with the provided tag.
    pub fn get_children(&self, tag: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|child| child.tag == tag)
            .collect()
    }

    /// Walk a nested child path and return terminal node text if found.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        if path.is_empty() {
            return self.text.as_deref();
        }

        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        current.text.as_deref()
    }

    /// Return an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Return the value of a simple YIN substatement, e.g. the `value`
    /// attribute of `<config value="false"/>`.
    pub fn child_attr<'a>(&'a self, tag: &str, attr: &str) -> Option<&'a str> {
        self.get_child(tag).and_then(|child| child.attr(attr))
    }

    /// Return the text of a YIN statement whose argument is encoded as an
    /// element, e.g. `<description><text>...</text></description>`.
    pub fn child_text<'a>(&'a self, tag: &str, element: &str) -> Option<&'a str> {
        self.get_text(&[tag, element]).map(str::trim)
    }
}
