use serde::Serialize;

use crate::check::{FindingCatalog, Severity};

#[derive(Debug, Serialize)]
struct JsonFinding<'a> {
    ordinal: usize,
    severity: Severity,
    kind: &'static str,
    message: &'static str,
    new: &'a str,
    old: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    errors: usize,
    warnings: usize,
    findings: Vec<JsonFinding<'a>>,
}

/// Format a catalog as pretty-printed JSON.
pub fn format_json(catalog: &FindingCatalog) -> String {
    let report = JsonReport {
        errors: catalog.error_count(),
        warnings: catalog.warning_count(),
        findings: catalog
            .to_report()
            .into_iter()
            .map(|entry| JsonFinding {
                ordinal: entry.ordinal,
                severity: entry.finding.severity(),
                kind: entry.finding.kind.code(),
                message: entry.finding.kind.message(),
                new: &entry.finding.new_detail,
                old: &entry.finding.old_detail,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}
