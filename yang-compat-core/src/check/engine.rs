use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::check::finding::{Finding, FindingCatalog, FindingKind};
use crate::check::path::PathTracker;
use crate::model::{
    find_by_local_name, ModuleModel, PathSegment, QName, SchemaNode, SchemaPath, Status, TypeDef,
};

/// YANG language version the check is performed under. Identity, `when`
/// and identityref-base rules only apply under RFC 7950.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RfcVersion {
    #[default]
    #[serde(rename = "6020")]
    Rfc6020,
    #[serde(rename = "7950")]
    Rfc7950,
}

impl RfcVersion {
    pub fn is_7950(self) -> bool {
        self == RfcVersion::Rfc7950
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown RFC version '{0}', expected 6020 or 7950")]
pub struct UnknownRfcVersion(pub String);

impl FromStr for RfcVersion {
    type Err = UnknownRfcVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "6020" | "1" => Ok(RfcVersion::Rfc6020),
            "7950" | "1.1" => Ok(RfcVersion::Rfc7950),
            other => Err(UnknownRfcVersion(other.to_string())),
        }
    }
}

impl Display for RfcVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RfcVersion::Rfc6020 => "6020",
            RfcVersion::Rfc7950 => "7950",
        })
    }
}

/// Compare `new` against `old` and collect every backward-incompatible
/// change. Content mismatches never fail; they become findings.
pub fn validate(old: &ModuleModel, new: &ModuleModel, rfc: RfcVersion) -> FindingCatalog {
    debug!(old = %old.name, new = %new.name, %rfc, "checking module compatibility");

    let mut checker = Checker {
        old,
        new,
        rfc,
        findings: FindingCatalog::new(),
    };
    checker.check_header();
    checker.check_revisions();
    if rfc.is_7950() {
        checker.check_identities();
    }
    checker.check_data_tree();
    checker.check_rpcs();
    checker.check_notifications();
    checker.check_augmentations();
    checker.check_typedefs();

    debug!(
        findings = checker.findings.len(),
        errors = checker.findings.error_count(),
        "compatibility check finished"
    );
    checker.findings
}

struct Checker<'a> {
    old: &'a ModuleModel,
    new: &'a ModuleModel,
    rfc: RfcVersion,
    findings: FindingCatalog,
}

impl<'a> Checker<'a> {
    fn report(&mut self, kind: FindingKind, new_detail: String, old_detail: String) {
        let finding = Finding::new(kind, new_detail, old_detail);
        if self.findings.add(finding) {
            debug!(%kind, "recorded finding");
        }
    }

    fn check_header(&mut self) {
        let (old, new) = (self.old, self.new);
        if old.name != new.name {
            self.report(FindingKind::NameError, new.name.clone(), old.name.clone());
        }
        if old.namespace != new.namespace {
            self.report(
                FindingKind::NamespaceError,
                new.namespace.clone(),
                old.namespace.clone(),
            );
        }
    }

    fn check_revisions(&mut self) {
        let (old, new) = (self.old, self.new);
        match (new.revision, old.revision) {
            (None, old_rev) => self.report(
                FindingKind::MissingRevisionError,
                "none".to_string(),
                show(old_rev),
            ),
            (Some(new_rev), Some(old_rev)) if new_rev <= old_rev => self.report(
                FindingKind::RevisionError,
                new_rev.to_string(),
                old_rev.to_string(),
            ),
            _ => {}
        }

        for old_rev in &old.revisions {
            if !new.revisions.contains(old_rev) {
                self.report(
                    FindingKind::MissingOldRevisionError,
                    "missing".to_string(),
                    old_rev.to_string(),
                );
            }
        }
    }

    fn check_identities(&mut self) {
        let (old, new) = (self.old, self.new);
        for old_identity in &old.identities {
            let name = &old_identity.qname.local_name;
            let Some(new_identity) = new.find_identity(name) else {
                self.report(
                    FindingKind::MissingIdentityError,
                    "missing".to_string(),
                    name.clone(),
                );
                continue;
            };

            if old_identity.bases.len() > new_identity.bases.len() {
                self.report(
                    FindingKind::BaseIdentityError,
                    format!("{name} {}", list_names(&new_identity.bases)),
                    format!("{name} {}", list_names(&old_identity.bases)),
                );
            }
            for old_base in &old_identity.bases {
                let present = new_identity
                    .bases
                    .iter()
                    .any(|base| base.local_name == old_base.local_name);
                if !present {
                    self.report(
                        FindingKind::MissingBaseIdentityError,
                        format!("{name} {}", list_names(&new_identity.bases)),
                        format!("{name} {}", old_base.local_name),
                    );
                }
            }
        }
    }

    fn check_data_tree(&mut self) {
        let old = self.old;
        let root = PathTracker::root();
        for old_node in &old.children {
            self.walk_data_node(old_node, &root);
        }
    }

    fn check_rpcs(&mut self) {
        let (old, new) = (self.old, self.new);
        let root = PathTracker::root();
        for old_rpc in &old.rpcs {
            let path = self.enter(&root, old_rpc);
            match new.find_rpc(old_rpc.local_name()) {
                Some(new_rpc) => self.compare_subtree(old_rpc, new_rpc, &path),
                None => self.missing_node(old_rpc, &path),
            }
        }
    }

    fn check_notifications(&mut self) {
        let (old, new) = (self.old, self.new);
        let root = PathTracker::root();
        for old_notification in &old.notifications {
            let path = self.enter(&root, old_notification);
            match new.find_notification(old_notification.local_name()) {
                Some(new_notification) => {
                    self.compare_subtree(old_notification, new_notification, &path)
                }
                None => self.missing_node(old_notification, &path),
            }
        }
    }

    fn check_augmentations(&mut self) {
        let (old, new) = (self.old, self.new);
        for old_aug in &old.augmentations {
            let Some(new_aug) = new.find_augmentation(&old_aug.target) else {
                self.report(
                    FindingKind::MissingNodeError,
                    "missing".to_string(),
                    format!("augment [{}]", old_aug.target),
                );
                continue;
            };

            let path = PathTracker::at(old_aug.target.clone(), new_aug.target.clone());
            for child in &old_aug.children {
                self.walk_nested(child, &new_aug.children, &path);
            }
        }
    }

    fn check_typedefs(&mut self) {
        let (old, new) = (self.old, self.new);
        let root = PathTracker::root();
        for old_typedef in &old.typedefs {
            let name = &old_typedef.qname.local_name;
            let Some(new_typedef) = new.find_typedef(name) else {
                continue;
            };
            let path = root.enter(
                PathSegment::new(&old.name, name),
                PathSegment::new(&new.name, name),
            );
            self.check_type_identity(old_typedef, new_typedef, &path);
            self.check_status(old_typedef.status, new_typedef.status, &path);
        }
    }

    fn enter(&self, parent: &PathTracker, node: &SchemaNode) -> PathTracker {
        parent.enter(
            PathSegment::new(&self.old.name, node.local_name()),
            PathSegment::new(&self.new.name, node.local_name()),
        )
    }

    /// Walk the data tree, resolving each new-side counterpart from the new
    /// module's root.
    fn walk_data_node(&mut self, old_node: &'a SchemaNode, parent: &PathTracker) {
        let path = self.enter(parent, old_node);
        let new = self.new;
        let Some(new_node) = new.find_node(path.new_path()) else {
            self.missing_node(old_node, &path);
            return;
        };

        trace!(path = %path.old(), "comparing data node");
        self.check_node(old_node, new_node, &path);
        for child in &old_node.children {
            self.walk_data_node(child, &path);
        }
    }

    /// Walk a subtree whose new-side parent is already known (operations,
    /// notifications, augmentations).
    fn walk_nested(
        &mut self,
        old_node: &'a SchemaNode,
        new_siblings: &'a [SchemaNode],
        parent: &PathTracker,
    ) {
        let path = self.enter(parent, old_node);
        match find_by_local_name(new_siblings, old_node.local_name()) {
            Some(new_node) => self.compare_subtree(old_node, new_node, &path),
            None => self.missing_node(old_node, &path),
        }
    }

    fn compare_subtree(&mut self, old_node: &'a SchemaNode, new_node: &'a SchemaNode, path: &PathTracker) {
        trace!(path = %path.old(), "comparing node");
        self.check_node(old_node, new_node, path);
        for child in &old_node.children {
            self.walk_nested(child, &new_node.children, path);
        }
    }

    fn missing_node(&mut self, old_node: &SchemaNode, path: &PathTracker) {
        self.report(
            FindingKind::MissingNodeError,
            at(path.new_path(), "missing"),
            at(path.old(), old_node.kind),
        );
    }

    fn check_node(&mut self, old: &SchemaNode, new: &SchemaNode, path: &PathTracker) {
        self.check_reference(old.reference.as_deref(), new.reference.as_deref(), path);
        self.check_musts(old, new, path);
        if self.rfc.is_7950() {
            self.check_when(old, new, path);
        }
        self.check_mandatory(old, new, path);
        self.check_config(old, new, path);
        self.check_status(old.status, new.status, path);
        self.check_element_counts(old, new, path);
        if let (Some(old_type), Some(new_type)) = (&old.type_def, &new.type_def) {
            self.check_type(old_type, new_type, path);
        }
    }

    fn check_reference(&mut self, old: Option<&str>, new: Option<&str>, path: &PathTracker) {
        if let (Some(old_ref), None) = (old, new) {
            self.report(
                FindingKind::ReferenceError,
                at(path.new_path(), "none"),
                at(path.old(), old_ref),
            );
        }
    }

    fn check_musts(&mut self, old: &SchemaNode, new: &SchemaNode, path: &PathTracker) {
        let (old_musts, new_musts) = (&old.musts, &new.musts);
        if old_musts.len() < new_musts.len() {
            self.report(
                FindingKind::AddedMustError,
                at(path.new_path(), list(new_musts)),
                at(path.old(), list(old_musts)),
            );
            return;
        }
        if old_musts.len() != new_musts.len() {
            return;
        }
        for must in new_musts {
            if !old_musts.contains(must) {
                self.report(
                    FindingKind::CheckMustWarning,
                    at(path.new_path(), must),
                    at(path.old(), list(old_musts)),
                );
            }
        }
    }

    fn check_when(&mut self, old: &SchemaNode, new: &SchemaNode, path: &PathTracker) {
        match (old.when.as_deref(), new.when.as_deref()) {
            (None, Some(new_when)) => self.report(
                FindingKind::AddedWhenError,
                at(path.new_path(), new_when),
                at(path.old(), "none"),
            ),
            (Some(old_when), Some(new_when)) if old_when != new_when => self.report(
                FindingKind::CheckWhenWarning,
                at(path.new_path(), new_when),
                at(path.old(), old_when),
            ),
            _ => {}
        }
    }

    fn check_mandatory(&mut self, old: &SchemaNode, new: &SchemaNode, path: &PathTracker) {
        if !old.is_mandatory() && new.is_mandatory() {
            self.report(
                FindingKind::MandatoryError,
                at(path.new_path(), true),
                at(path.old(), false),
            );
        }
    }

    // false -> true is only illegal when the node is also mandatory now.
    fn check_config(&mut self, old: &SchemaNode, new: &SchemaNode, path: &PathTracker) {
        match (old.config, new.config) {
            (Some(true), Some(false)) => self.report(
                FindingKind::IllegalConfigChangeError,
                at(path.new_path(), false),
                at(path.old(), true),
            ),
            (Some(false), Some(true)) if new.is_mandatory() => self.report(
                FindingKind::IllegalConfigStateError,
                at(path.new_path(), "true, mandatory"),
                at(path.old(), false),
            ),
            _ => {}
        }
    }

    fn check_status(&mut self, old: Status, new: Status, path: &PathTracker) {
        if old < new {
            self.report(
                FindingKind::StatusError,
                at(path.new_path(), new),
                at(path.old(), old),
            );
        }
    }

    fn check_element_counts(&mut self, old: &SchemaNode, new: &SchemaNode, path: &PathTracker) {
        let old_count = old.element_count.unwrap_or_default();
        let new_count = new.element_count.unwrap_or_default();

        let min_raised = match (old_count.min, new_count.min) {
            (None, Some(_)) => true,
            (Some(old_min), Some(new_min)) => old_min < new_min,
            _ => false,
        };
        if min_raised {
            self.report(
                FindingKind::MinElementsError,
                at(path.new_path(), show(new_count.min)),
                at(path.old(), show(old_count.min)),
            );
        }

        if let (Some(old_max), Some(new_max)) = (old_count.max, new_count.max) {
            if new_max < old_max {
                self.report(
                    FindingKind::MaxElementsError,
                    at(path.new_path(), new_max),
                    at(path.old(), old_max),
                );
            }
        }
    }

    fn check_type_identity(&mut self, old: &TypeDef, new: &TypeDef, path: &PathTracker) -> bool {
        if old.builtin_name() == new.builtin_name() {
            return true;
        }
        self.report(
            FindingKind::TypeError,
            at(path.new_path(), new.builtin_name()),
            at(path.old(), old.builtin_name()),
        );
        false
    }

    fn check_type(&mut self, old: &TypeDef, new: &TypeDef, path: &PathTracker) {
        if !self.check_type_identity(old, new, path) {
            return;
        }

        if let Some(old_default) = old.default_value.as_deref() {
            if new.default_value.as_deref() != Some(old_default) {
                self.report(
                    FindingKind::DefaultError,
                    at(path.new_path(), show(new.default_value.as_deref())),
                    at(path.old(), old_default),
                );
            }
        }

        if let (Some(old_units), None) = (old.units.as_deref(), new.units.as_deref()) {
            self.report(
                FindingKind::UnitsError,
                at(path.new_path(), "none"),
                at(path.old(), old_units),
            );
        }

        self.check_reference(old.reference.as_deref(), new.reference.as_deref(), path);

        if self.rfc.is_7950() {
            if let (Some(old_bases), Some(new_bases)) = (old.identity_bases(), new.identity_bases())
            {
                if old_bases.is_empty() || old_bases.len() > new_bases.len() {
                    self.report(
                        FindingKind::IdentityRefBaseError,
                        at(path.new_path(), list_names(new_bases)),
                        at(path.old(), list_names(old_bases)),
                    );
                }
            }
        }

        if let Some(old_length) = old.length() {
            let narrowed = match new.length() {
                None => !old_length.is_unrestricted(),
                Some(new_length) => !new_length.is_superset_of(old_length),
            };
            if narrowed {
                self.report(
                    FindingKind::LengthError,
                    at(path.new_path(), show(new.length())),
                    at(path.old(), old_length),
                );
            }
        }

        if let Some(old_range) = old.range() {
            let narrowed = match new.range() {
                None => true,
                Some(new_range) => !new_range.is_superset_of(old_range),
            };
            if narrowed {
                self.report(
                    FindingKind::RangeError,
                    at(path.new_path(), show(new.range())),
                    at(path.old(), old_range),
                );
            }
        }

        let enum_missing = old
            .enums()
            .iter()
            .any(|old_enum| !new.enums().iter().any(|e| e.same_value(old_enum)));
        if enum_missing {
            self.report(
                FindingKind::MissingEnumError,
                at(path.new_path(), list(new.enums())),
                at(path.old(), list(old.enums())),
            );
        }

        for old_bit in old.bits() {
            if !new.bits().iter().any(|bit| bit.same_bit(old_bit)) {
                self.report(
                    FindingKind::MissingBitError,
                    at(path.new_path(), list(new.bits())),
                    at(path.old(), old_bit),
                );
            }
        }

        if old.patterns() != new.patterns() {
            self.report(
                FindingKind::PatternError,
                at(path.new_path(), list(new.patterns())),
                at(path.old(), list(old.patterns())),
            );
        }
    }
}

/// Detail text for a node-level finding: the observed value and where.
fn at(path: &SchemaPath, value: impl Display) -> String {
    format!("{value} [{path}]")
}

fn show<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

fn list<T: Display>(items: &[T]) -> String {
    let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

fn list_names(names: &[QName]) -> String {
    let rendered: Vec<&str> = names.iter().map(|q| q.local_name.as_str()).collect();
    format!("[{}]", rendered.join(", "))
}
