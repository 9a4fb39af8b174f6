use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::resolve::required_attr;
use super::LoadError;
use crate::model::Revision;
use crate::tree::XmlNode;

/// An `import` statement of a module.
#[derive(Debug, Clone)]
pub(crate) struct ImportStmt {
    pub module: String,
    pub prefix: String,
    pub revision: Option<Revision>,
}

/// A parsed but not yet resolved YIN module with its header already read.
#[derive(Debug, Clone)]
pub(crate) struct ModuleSource {
    pub name: String,
    pub namespace: String,
    pub prefix: String,
    /// Newest revision date.
    pub revision: Option<Revision>,
    /// Revision dates in declaration order.
    pub revisions: Vec<Revision>,
    pub imports: Vec<ImportStmt>,
    pub root: XmlNode,
    /// Directory the module was read from, searched first for its imports.
    pub dir: Option<PathBuf>,
}

impl ModuleSource {
    pub fn from_xml(root: XmlNode, origin: &str, dir: Option<PathBuf>) -> Result<Self, LoadError> {
        if root.tag != "module" {
            return Err(LoadError::NotAModule {
                origin: origin.to_string(),
                tag: root.tag.clone(),
            });
        }
        let name = root
            .attr("name")
            .ok_or_else(|| LoadError::MissingArgument {
                module: origin.to_string(),
                statement: "module".to_string(),
                argument: "name".to_string(),
            })?
            .to_string();
        let missing = |statement: &str| LoadError::MissingStatement {
            module: name.clone(),
            statement: statement.to_string(),
        };
        let namespace = root
            .child_attr("namespace", "uri")
            .ok_or_else(|| missing("namespace"))?
            .to_string();
        let prefix = root
            .child_attr("prefix", "value")
            .ok_or_else(|| missing("prefix"))?
            .to_string();

        let revisions = root
            .get_children("revision")
            .into_iter()
            .map(|stmt| parse_revision(required_attr(stmt, "date", &name)?, &name))
            .collect::<Result<Vec<_>, _>>()?;
        let revision = revisions.iter().max().copied();

        let mut imports = Vec::new();
        for stmt in root.get_children("import") {
            let module = required_attr(stmt, "module", &name)?.to_string();
            let prefix = stmt
                .child_attr("prefix", "value")
                .ok_or_else(|| missing("prefix"))?
                .to_string();
            let revision = stmt
                .child_attr("revision-date", "date")
                .map(|date| parse_revision(date, &name))
                .transpose()?;
            imports.push(ImportStmt {
                module,
                prefix,
                revision,
            });
        }

        for stmt in root.get_children("include") {
            warn!(
                module = %name,
                submodule = stmt.attr("module").unwrap_or_default(),
                "submodule include ignored"
            );
        }
        for stmt in root.get_children("deviation") {
            warn!(
                module = %name,
                target = stmt.attr("target-node").unwrap_or_default(),
                "deviation ignored"
            );
        }
        if root.get_child("feature").is_some() {
            debug!(module = %name, "feature statements ignored, if-feature is treated as enabled");
        }

        Ok(Self {
            name,
            namespace,
            prefix,
            revision,
            revisions,
            imports,
            root,
            dir,
        })
    }

    /// Name of the module imported under `prefix`.
    pub fn imported_module(&self, prefix: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|import| import.prefix == prefix)
            .map(|import| import.module.as_str())
    }
}

fn parse_revision(date: &str, module: &str) -> Result<Revision, LoadError> {
    date.parse().map_err(|_| LoadError::InvalidValue {
        module: module.to_string(),
        what: "revision date",
        value: date.to_string(),
    })
}

/// Find `module` in `dir`: `<module>@<revision>.yin` when a revision is
/// requested, then `<module>.yin`, then the newest `<module>@*.yin`.
pub(crate) fn find_module_file(dir: &Path, module: &str, revision: Option<Revision>) -> Option<PathBuf> {
    if let Some(revision) = revision {
        let exact = dir.join(format!("{module}@{revision}.yin"));
        if exact.is_file() {
            return Some(exact);
        }
    }
    let plain = dir.join(format!("{module}.yin"));
    if plain.is_file() {
        return Some(plain);
    }

    let prefix = format!("{module}@");
    let mut dated: BTreeMap<Revision, PathBuf> = BTreeMap::new();
    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(date) = file_name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".yin"))
        else {
            continue;
        };
        if let Ok(date) = date.parse::<Revision>() {
            dated.insert(date, path);
        }
    }
    dated.into_values().next_back()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::find_module_file;

    #[test]
    fn lookup_prefers_exact_revision_then_plain_then_newest() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("types@2020-01-01.yin"), "<module/>").expect("write");
        fs::write(dir.path().join("types@2021-06-01.yin"), "<module/>").expect("write");

        let exact = find_module_file(dir.path(), "types", "2020-01-01".parse().ok()).expect("exact");
        assert!(exact.ends_with("types@2020-01-01.yin"));

        let newest = find_module_file(dir.path(), "types", None).expect("newest");
        assert!(newest.ends_with("types@2021-06-01.yin"));

        fs::write(dir.path().join("types.yin"), "<module/>").expect("write");
        let plain = find_module_file(dir.path(), "types", None).expect("plain");
        assert!(plain.ends_with("types.yin"));

        assert!(find_module_file(dir.path(), "other", None).is_none());
    }
}
