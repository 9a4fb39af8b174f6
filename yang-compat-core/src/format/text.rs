use crate::check::{FindingCatalog, FindingKind};

/// Render a catalog as numbered plain text, one block per finding:
///
/// ```text
/// 1. [error] illegal-config-change: config changed from true to false
///    new config: false [/m:system/m:hostname]
///    old config: true [/m:system/m:hostname]
/// ```
pub fn format_report(catalog: &FindingCatalog) -> String {
    let mut lines = Vec::with_capacity(catalog.len() * 3);
    for entry in catalog.to_report() {
        let finding = entry.finding;
        let label = field_label(finding.kind);
        lines.push(format!(
            "{}. [{}] {}: {}",
            entry.ordinal,
            finding.severity(),
            finding.kind.code(),
            finding.kind.message()
        ));
        lines.push(format!("   new {label}: {}", finding.new_detail));
        lines.push(format!("   old {label}: {}", finding.old_detail));
    }
    lines.join("\n")
}

/// Format a one-line count of findings by severity.
pub fn format_summary(catalog: &FindingCatalog) -> String {
    format!(
        "findings={} errors={} warnings={}",
        catalog.len(),
        catalog.error_count(),
        catalog.warning_count()
    )
}

fn field_label(kind: FindingKind) -> &'static str {
    match kind {
        FindingKind::NameError => "name",
        FindingKind::NamespaceError => "namespace",
        FindingKind::RevisionError | FindingKind::MissingRevisionError => "revision",
        FindingKind::MissingOldRevisionError => "revision history",
        FindingKind::MissingIdentityError => "identity",
        FindingKind::BaseIdentityError | FindingKind::MissingBaseIdentityError => "base",
        FindingKind::MissingNodeError => "node",
        FindingKind::ReferenceError => "reference",
        FindingKind::AddedMustError | FindingKind::CheckMustWarning => "must",
        FindingKind::AddedWhenError | FindingKind::CheckWhenWarning => "when",
        FindingKind::MandatoryError => "mandatory",
        FindingKind::IllegalConfigChangeError | FindingKind::IllegalConfigStateError => "config",
        FindingKind::StatusError => "status",
        FindingKind::MinElementsError => "min-elements",
        FindingKind::MaxElementsError => "max-elements",
        FindingKind::TypeError => "type",
        FindingKind::DefaultError => "default",
        FindingKind::UnitsError => "units",
        FindingKind::IdentityRefBaseError => "bases",
        FindingKind::LengthError => "length",
        FindingKind::RangeError => "ranges",
        FindingKind::MissingEnumError => "enums",
        FindingKind::MissingBitError => "bits",
        FindingKind::PatternError => "patterns",
    }
}
