//! YIN (XML-encoded YANG) module loader.
//!
//! Builds a resolved [`ModuleModel`] from a YIN document: typedef chains are
//! followed to their built-in root with effective facets, `uses` is expanded
//! in place (including `refine`), and imported modules are located on the
//! search path so their typedefs, groupings and identities can be resolved.
//!
//! Submodules, deviations and features are not interpreted.

mod nodes;
mod resolve;
mod source;
mod types;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::model::ModuleModel;
use crate::parser::{parse, parse_file, ParseError};

use resolve::Resolver;
use source::{ImportStmt, ModuleSource};

/// Errors raised while turning a YIN document into a [`ModuleModel`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document could not be read or is not well-formed XML.
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: ParseError },
    /// The root element is not `<module>`.
    #[error("{origin}: root element <{tag}> is not a YIN module")]
    NotAModule { origin: String, tag: String },
    /// A required substatement is absent.
    #[error("module '{module}': missing '{statement}' statement")]
    MissingStatement { module: String, statement: String },
    /// A statement lacks its argument attribute.
    #[error("module '{module}': '{statement}' has no '{argument}' argument")]
    MissingArgument {
        module: String,
        statement: String,
        argument: String,
    },
    /// An imported module could not be found on the search path.
    #[error("module '{module}': imported module '{import}' not found in search paths")]
    ImportNotFound { module: String, import: String },
    /// A prefixed reference uses a prefix that is neither the module's own
    /// nor an import's.
    #[error("module '{module}': unknown prefix '{prefix}'")]
    UnknownPrefix { module: String, prefix: String },
    #[error("module '{module}': unresolved type '{name}'")]
    UnresolvedType { module: String, name: String },
    #[error("module '{module}': unresolved grouping '{name}'")]
    UnresolvedGrouping { module: String, name: String },
    /// An argument could not be interpreted.
    #[error("module '{module}': invalid {what} '{value}'")]
    InvalidValue {
        module: String,
        what: &'static str,
        value: String,
    },
    /// Typedef or grouping expansion exceeded the nesting limit, which is
    /// what a self-referencing definition looks like.
    #[error("module '{module}': '{name}' is nested too deeply or refers to itself")]
    TooDeep { module: String, name: String },
}

/// Loads YIN modules and the modules they import.
///
/// A loader caches imported modules by name; use one loader per side of a
/// comparison so the old and new revisions of a shared import do not mix.
#[derive(Debug, Default)]
pub struct ModuleLoader {
    search_paths: Vec<PathBuf>,
    imports: BTreeMap<String, ModuleSource>,
}

impl ModuleLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            imports: BTreeMap::new(),
        }
    }

    /// Load a module file. Its directory is searched for imports before the
    /// configured search paths.
    pub fn load_file(&mut self, path: &Path) -> Result<ModuleModel, LoadError> {
        let root = parse_file(path).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        let dir = path.parent().map(Path::to_path_buf);
        self.load_source(ModuleSource::from_xml(root, &path.display().to_string(), dir)?)
    }

    /// Load a module from an in-memory document.
    pub fn load_bytes(&mut self, bytes: &[u8], base_dir: Option<&Path>) -> Result<ModuleModel, LoadError> {
        let root = parse(bytes).map_err(|source| LoadError::Parse {
            path: "<memory>".to_string(),
            source,
        })?;
        self.load_source(ModuleSource::from_xml(
            root,
            "<memory>",
            base_dir.map(Path::to_path_buf),
        )?)
    }

    fn load_source(&mut self, main: ModuleSource) -> Result<ModuleModel, LoadError> {
        debug!(module = %main.name, revision = ?main.revision, "loading module");
        self.load_imports(&main.name, &main.imports, main.dir.clone())?;
        Resolver::new(&main, &self.imports).build_module()
    }

    fn load_imports(
        &mut self,
        importer: &str,
        requests: &[ImportStmt],
        dir: Option<PathBuf>,
    ) -> Result<(), LoadError> {
        for request in requests {
            if self.imports.contains_key(&request.module) {
                continue;
            }
            let path = self
                .locate(request, dir.as_deref())
                .ok_or_else(|| LoadError::ImportNotFound {
                    module: importer.to_string(),
                    import: request.module.clone(),
                })?;
            debug!(module = %request.module, path = %path.display(), "loading import");

            let root = parse_file(&path).map_err(|source| LoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;
            let imported = ModuleSource::from_xml(
                root,
                &path.display().to_string(),
                path.parent().map(Path::to_path_buf),
            )?;
            let nested = imported.imports.clone();
            let nested_dir = imported.dir.clone();
            let name = imported.name.clone();
            self.imports.insert(request.module.clone(), imported);
            self.load_imports(&name, &nested, nested_dir)?;
        }
        Ok(())
    }

    fn locate(&self, request: &ImportStmt, importer_dir: Option<&Path>) -> Option<PathBuf> {
        importer_dir
            .into_iter()
            .chain(self.search_paths.iter().map(PathBuf::as_path))
            .find_map(|dir| source::find_module_file(dir, &request.module, request.revision))
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadError, ModuleLoader};

    #[test]
    fn rejects_non_module_root() {
        let err = ModuleLoader::default()
            .load_bytes(b"<submodule name=\"s\"/>", None)
            .expect_err("submodule root");
        assert!(matches!(err, LoadError::NotAModule { .. }));
    }

    #[test]
    fn missing_import_is_reported() {
        let err = ModuleLoader::default()
            .load_bytes(
                br#"<module name="m" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
                      <namespace uri="urn:m"/>
                      <prefix value="m"/>
                      <import module="absent-types"><prefix value="at"/></import>
                    </module>"#,
                None,
            )
            .expect_err("import cannot be found");
        assert!(
            matches!(err, LoadError::ImportNotFound { ref import, .. } if import == "absent-types")
        );
    }
}
