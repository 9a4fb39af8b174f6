use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// Every compatibility rule that can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FindingKind {
    NameError,
    NamespaceError,
    RevisionError,
    MissingRevisionError,
    MissingOldRevisionError,
    MissingIdentityError,
    BaseIdentityError,
    MissingBaseIdentityError,
    MissingNodeError,
    ReferenceError,
    AddedMustError,
    CheckMustWarning,
    AddedWhenError,
    CheckWhenWarning,
    MandatoryError,
    IllegalConfigChangeError,
    IllegalConfigStateError,
    StatusError,
    MinElementsError,
    MaxElementsError,
    TypeError,
    DefaultError,
    UnitsError,
    IdentityRefBaseError,
    LengthError,
    RangeError,
    MissingEnumError,
    MissingBitError,
    PatternError,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        match self {
            FindingKind::CheckMustWarning | FindingKind::CheckWhenWarning => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable kebab-case identifier used in machine-readable output.
    pub fn code(self) -> &'static str {
        match self {
            FindingKind::NameError => "name",
            FindingKind::NamespaceError => "namespace",
            FindingKind::RevisionError => "revision",
            FindingKind::MissingRevisionError => "missing-revision",
            FindingKind::MissingOldRevisionError => "missing-old-revision",
            FindingKind::MissingIdentityError => "missing-identity",
            FindingKind::BaseIdentityError => "base-identity",
            FindingKind::MissingBaseIdentityError => "missing-base-identity",
            FindingKind::MissingNodeError => "missing-node",
            FindingKind::ReferenceError => "reference",
            FindingKind::AddedMustError => "added-must",
            FindingKind::CheckMustWarning => "check-must",
            FindingKind::AddedWhenError => "added-when",
            FindingKind::CheckWhenWarning => "check-when",
            FindingKind::MandatoryError => "mandatory",
            FindingKind::IllegalConfigChangeError => "illegal-config-change",
            FindingKind::IllegalConfigStateError => "illegal-config-state",
            FindingKind::StatusError => "status",
            FindingKind::MinElementsError => "min-elements",
            FindingKind::MaxElementsError => "max-elements",
            FindingKind::TypeError => "type",
            FindingKind::DefaultError => "default",
            FindingKind::UnitsError => "units",
            FindingKind::IdentityRefBaseError => "identityref-base",
            FindingKind::LengthError => "length",
            FindingKind::RangeError => "range",
            FindingKind::MissingEnumError => "missing-enum",
            FindingKind::MissingBitError => "missing-bit",
            FindingKind::PatternError => "pattern",
        }
    }

    /// Human-readable rule message.
    pub fn message(self) -> &'static str {
        match self {
            FindingKind::NameError => "module name changed",
            FindingKind::NamespaceError => "module namespace changed",
            FindingKind::RevisionError => "new revision is not newer than the old revision",
            FindingKind::MissingRevisionError => "new module has no revision",
            FindingKind::MissingOldRevisionError => "old revision removed from revision history",
            FindingKind::MissingIdentityError => "identity removed",
            FindingKind::BaseIdentityError => "identity lost base identities",
            FindingKind::MissingBaseIdentityError => "identity base removed",
            FindingKind::MissingNodeError => "definition removed",
            FindingKind::ReferenceError => "reference statement removed",
            FindingKind::AddedMustError => "must constraint added",
            FindingKind::CheckMustWarning => "must constraint changed, check semantics",
            FindingKind::AddedWhenError => "when condition added",
            FindingKind::CheckWhenWarning => "when condition changed, check semantics",
            FindingKind::MandatoryError => "node became mandatory",
            FindingKind::IllegalConfigChangeError => "config changed from true to false",
            FindingKind::IllegalConfigStateError => {
                "config changed from false to true on a mandatory node"
            }
            FindingKind::StatusError => "status moved backwards",
            FindingKind::MinElementsError => "min-elements increased",
            FindingKind::MaxElementsError => "max-elements decreased",
            FindingKind::TypeError => "base type changed",
            FindingKind::DefaultError => "default value changed or removed",
            FindingKind::UnitsError => "units removed",
            FindingKind::IdentityRefBaseError => "identityref bases reduced",
            FindingKind::LengthError => "allowed length narrowed",
            FindingKind::RangeError => "allowed range narrowed",
            FindingKind::MissingEnumError => "enum removed or renumbered",
            FindingKind::MissingBitError => "bit removed or repositioned",
            FindingKind::PatternError => "patterns changed",
        }
    }
}

impl Display for FindingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One observed incompatibility. Equality covers all three fields and is
/// what the catalog deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub new_detail: String,
    pub old_detail: String,
}

impl Finding {
    pub fn new(kind: FindingKind, new_detail: impl Into<String>, old_detail: impl Into<String>) -> Self {
        Self {
            kind,
            new_detail: new_detail.into(),
            old_detail: old_detail.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// A finding paired with its 1-based position in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportEntry<'a> {
    pub ordinal: usize,
    pub finding: &'a Finding,
}

/// Insertion-ordered set of findings.
#[derive(Debug, Clone, Default)]
pub struct FindingCatalog {
    seen: HashSet<Finding>,
    ordered: Vec<Finding>,
}

impl FindingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding unless an equal one is already present. Returns
    /// whether the finding was inserted.
    pub fn add(&mut self, finding: Finding) -> bool {
        if self.seen.contains(&finding) {
            return false;
        }
        self.seen.insert(finding.clone());
        self.ordered.push(finding);
        true
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.ordered.iter()
    }

    pub fn count_of(&self, kind: FindingKind) -> usize {
        self.ordered.iter().filter(|f| f.kind == kind).count()
    }

    pub fn error_count(&self) -> usize {
        self.count_by_severity(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_by_severity(Severity::Warning)
    }

    fn count_by_severity(&self, severity: Severity) -> usize {
        self.ordered
            .iter()
            .filter(|f| f.severity() == severity)
            .count()
    }

    /// Findings in first-insertion order with ordinals assigned now.
    pub fn to_report(&self) -> Vec<ReportEntry<'_>> {
        self.ordered
            .iter()
            .enumerate()
            .map(|(idx, finding)| ReportEntry {
                ordinal: idx + 1,
                finding,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a FindingCatalog {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.iter()
    }
}
