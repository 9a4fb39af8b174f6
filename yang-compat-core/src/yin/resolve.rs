use std::collections::BTreeMap;

use super::source::ModuleSource;
use super::LoadError;
use crate::model::{QName, Status};
use crate::tree::XmlNode;

/// Maximum typedef/grouping nesting before expansion is abandoned.
const MAX_DEPTH: usize = 64;

/// Resolves the statements of one module against itself and its imports.
pub(crate) struct Resolver<'a> {
    pub main: &'a ModuleSource,
    imports: &'a BTreeMap<String, ModuleSource>,
}

/// Lexical position of a statement: the module it is written in and the
/// enclosing statements whose typedefs and groupings are visible.
#[derive(Debug, Clone)]
pub(crate) struct Scope<'a> {
    pub source: &'a ModuleSource,
    ancestors: Vec<&'a XmlNode>,
    depth: usize,
}

impl<'a> Scope<'a> {
    pub fn module(source: &'a ModuleSource) -> Self {
        Self {
            source,
            ancestors: vec![&source.root],
            depth: 0,
        }
    }

    /// The scope seen by substatements of `stmt`.
    pub fn enter(&self, stmt: &'a XmlNode) -> Self {
        let mut inner = self.clone();
        inner.ancestors.push(stmt);
        inner
    }

    /// Count one more level of typedef or grouping indirection.
    pub fn deeper(mut self, name: &str) -> Result<Self, LoadError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(LoadError::TooDeep {
                module: self.source.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(self)
    }

    pub fn module_name(&self) -> &str {
        &self.source.name
    }
}

/// Inherited `config` while building data nodes. `None` inside rpcs,
/// actions and notifications.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DataCtx {
    pub config: Option<bool>,
}

impl DataCtx {
    pub fn data(config: bool) -> Self {
        Self {
            config: Some(config),
        }
    }

    pub fn operation() -> Self {
        Self { config: None }
    }
}

impl<'a> Resolver<'a> {
    pub fn new(main: &'a ModuleSource, imports: &'a BTreeMap<String, ModuleSource>) -> Self {
        Self { main, imports }
    }

    /// The module bound to `prefix` as seen from `from`.
    pub fn module_for_prefix(
        &self,
        from: &'a ModuleSource,
        prefix: &str,
    ) -> Result<&'a ModuleSource, LoadError> {
        if prefix == from.prefix {
            return Ok(from);
        }
        let unknown = || LoadError::UnknownPrefix {
            module: from.name.clone(),
            prefix: prefix.to_string(),
        };
        let name = from.imported_module(prefix).ok_or_else(unknown)?;
        if name == self.main.name {
            return Ok(self.main);
        }
        self.imports.get(name).ok_or_else(unknown)
    }

    /// Qualified name of a (possibly prefixed) reference such as an
    /// identity base.
    pub fn qualify(&self, reference: &str, scope: &Scope<'a>) -> Result<QName, LoadError> {
        let (prefix, local) = split_prefixed(reference);
        let module = match prefix {
            Some(prefix) => self.module_for_prefix(scope.source, prefix)?,
            None => scope.source,
        };
        Ok(QName::new(module.namespace.clone(), local).with_revision(module.revision))
    }

    /// Locate a `typedef` or `grouping` named by `reference`, returning the
    /// statement and the scope its body resolves in.
    pub fn find_definition(
        &self,
        keyword: &str,
        reference: &str,
        scope: &Scope<'a>,
    ) -> Result<Option<(&'a XmlNode, Scope<'a>)>, LoadError> {
        let (prefix, local) = split_prefixed(reference);
        match prefix {
            Some(prefix) if prefix != scope.source.prefix => {
                let target = self.module_for_prefix(scope.source, prefix)?;
                let found = find_named(&target.root, keyword, local).map(|stmt| {
                    let mut def_scope = Scope::module(target);
                    def_scope.depth = scope.depth;
                    (stmt, def_scope)
                });
                Ok(found)
            }
            _ => {
                for (idx, ancestor) in scope.ancestors.iter().enumerate().rev() {
                    if let Some(stmt) = find_named(ancestor, keyword, local) {
                        let def_scope = Scope {
                            source: scope.source,
                            ancestors: scope.ancestors[..=idx].to_vec(),
                            depth: scope.depth,
                        };
                        return Ok(Some((stmt, def_scope)));
                    }
                }
                Ok(None)
            }
        }
    }

    /// Qualified name of a schema node owned by the module being loaded.
    pub fn node_qname(&self, local: &str) -> QName {
        QName::new(self.main.namespace.clone(), local).with_revision(self.main.revision)
    }
}

/// Split `prefix:local` into its parts.
pub(crate) fn split_prefixed(reference: &str) -> (Option<&str>, &str) {
    let reference = reference.trim();
    match reference.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, reference),
    }
}

fn find_named<'x>(parent: &'x XmlNode, keyword: &str, name: &str) -> Option<&'x XmlNode> {
    parent
        .children
        .iter()
        .find(|child| child.tag == keyword && child.attr("name") == Some(name))
}

pub(crate) fn required_attr<'x>(stmt: &'x XmlNode, argument: &str, module: &str) -> Result<&'x str, LoadError> {
    stmt.attr(argument).ok_or_else(|| LoadError::MissingArgument {
        module: module.to_string(),
        statement: stmt.tag.clone(),
        argument: argument.to_string(),
    })
}

pub(crate) fn invalid(module: &str, what: &'static str, value: &str) -> LoadError {
    LoadError::InvalidValue {
        module: module.to_string(),
        what,
        value: value.to_string(),
    }
}

pub(crate) fn parse_bool(value: &str, what: &'static str, module: &str) -> Result<bool, LoadError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(invalid(module, what, other)),
    }
}

pub(crate) fn status_of(stmt: &XmlNode, module: &str) -> Result<Status, LoadError> {
    match stmt.child_attr("status", "value") {
        Some(raw) => raw.parse().map_err(|bad: String| invalid(module, "status", &bad)),
        None => Ok(Status::Current),
    }
}

pub(crate) fn description_of(stmt: &XmlNode) -> Option<String> {
    stmt.child_text("description", "text").map(str::to_string)
}

pub(crate) fn reference_of(stmt: &XmlNode) -> Option<String> {
    stmt.child_text("reference", "text").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::split_prefixed;

    #[test]
    fn split_prefixed_handles_bare_names() {
        assert_eq!(split_prefixed("inet:port-number"), (Some("inet"), "port-number"));
        assert_eq!(split_prefixed(" counter "), (None, "counter"));
    }
}
