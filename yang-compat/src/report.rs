use colored::Colorize;
use serde::Deserialize;
use yang_compat_core::{format_json, format_report, format_summary, FindingCatalog};

/// Output format of the check report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Render findings for terminal output.
pub fn render_text(catalog: &FindingCatalog) -> String {
    if catalog.is_empty() {
        return "no compatibility findings".green().to_string();
    }

    let raw = format_report(catalog);
    let mut out = Vec::new();
    for line in raw.lines() {
        let colored = if line.contains("[error]") {
            line.red().to_string()
        } else if line.contains("[warning]") {
            line.yellow().to_string()
        } else if line.trim_start().starts_with("old ") {
            line.dimmed().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }
    out.join("\n")
}

/// Render summary counts for terminal output.
pub fn render_summary(catalog: &FindingCatalog) -> String {
    let summary = format_summary(catalog);
    if catalog.error_count() > 0 {
        summary.red().bold().to_string()
    } else {
        summary.cyan().to_string()
    }
}

/// Render the report in the requested format.
pub fn render(catalog: &FindingCatalog, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => format!("{}\n{}", render_text(catalog), render_summary(catalog)),
        ReportFormat::Json => format_json(catalog),
    }
}
