use crate::cli::OutputFormat;
use crate::models::ReconcileReport;
use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::fs;
use std::path::Path;

/// Generate and output a report in the specified format
pub fn generate_report(
    report: &ReconcileReport,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<()> {
    let output = match format {
        OutputFormat::Terminal => format_terminal(report),
        OutputFormat::Markdown => format_markdown(report),
        OutputFormat::Json => format_json(report)?,
    };

    if let Some(path) = output_path {
        fs::write(path, output)
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
        println!("Report written to {}", path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn status_of(report: &ReconcileReport, entry: &str) -> &'static str {
    if report.previous.iter().any(|p| p == entry) {
        "kept"
    } else {
        "new"
    }
}

/// Format report as terminal table
fn format_terminal(report: &ReconcileReport) -> String {
    let mut output = String::new();

    let line = "─".repeat(58);
    output.push_str(&format!("╭{}╮\n", line));
    output.push_str(&format!("│ {:^56} │\n", "debtcloset - Exclusion Report"));
    output.push_str(&format!("│ Tool: {:<50} │\n", report.tool));
    output.push_str(&format!("│ Config: {:<48} │\n", report.config_path.display()));
    output.push_str(&format!(
        "│ Excluded: {:<46} │\n",
        format!(
            "{} (+{} / -{})",
            report.exclusions.len(),
            report.added().len(),
            report.removed().len()
        )
    ));
    output.push_str(&format!("╰{}╯\n\n", line));

    if report.exclusions.is_empty() {
        output.push_str("No exclusions needed: every file passes.\n");
    } else {
        output.push_str("Exclusions:\n");
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Entry").fg(Color::Cyan),
                Cell::new("Source").fg(Color::Cyan),
                Cell::new("Status").fg(Color::Cyan),
            ]);

        for entry in &report.exclusions {
            let status = status_of(report, entry);
            let status_cell = if status == "new" {
                Cell::new(status).fg(Color::Yellow)
            } else {
                Cell::new(status)
            };
            table.add_row(vec![
                Cell::new(entry),
                Cell::new(report.source_of(entry)),
                status_cell,
            ]);
        }

        output.push_str(&format!("{}\n", table));
    }

    let removed = report.removed();
    if !removed.is_empty() {
        output.push_str("\nNo longer excluded:\n");
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![Cell::new("Entry").fg(Color::Green)]);

        for entry in removed {
            table.add_row(vec![entry]);
        }

        output.push_str(&format!("{}\n", table));
    }

    output
}

/// Format report as Markdown
fn format_markdown(report: &ReconcileReport) -> String {
    let mut output = String::new();

    output.push_str("# debtcloset - Exclusion Report\n\n");
    output.push_str(&format!("**Tool**: {}\n", report.tool));
    output.push_str(&format!("**Config**: `{}`\n", report.config_path.display()));
    output.push_str(&format!("**Excluded**: {}\n", report.exclusions.len()));
    output.push_str(&format!(
        "**Generated**: {}\n\n",
        report.reconciled_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if !report.exclusions.is_empty() {
        output.push_str("## Exclusions\n\n");
        output.push_str("| Entry | Source | Status |\n");
        output.push_str("|---|---|---|\n");
        for entry in &report.exclusions {
            output.push_str(&format!(
                "| `{}` | {} | {} |\n",
                entry,
                report.source_of(entry),
                status_of(report, entry)
            ));
        }
        output.push('\n');
    }

    let removed = report.removed();
    if !removed.is_empty() {
        output.push_str("## No Longer Excluded\n\n");
        for entry in removed {
            output.push_str(&format!("- `{}`\n", entry));
        }
        output.push('\n');
    }

    output
}

/// Format report as JSON
fn format_json(report: &ReconcileReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tool;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_report() -> ReconcileReport {
        ReconcileReport::new(
            Tool::Pyright,
            PathBuf::from("/test/project/pyproject.toml"),
            strings(&["src/fixed.py", "src/module1.py"]),
            strings(&[".tox/*"]),
            strings(&["src/module1.py", "src/module2.py"]),
        )
    }

    #[test]
    fn test_format_terminal() {
        let report = create_test_report();
        let output = format_terminal(&report);

        assert!(output.contains("debtcloset - Exclusion Report"));
        assert!(output.contains("Tool: pyright"));
        assert!(output.contains("Excluded: 3 (+2 / -1)"));
        assert!(output.contains("src/module2.py"));
        assert!(output.contains("No longer excluded"));
        assert!(output.contains("src/fixed.py"));
    }

    #[test]
    fn test_format_terminal_clean_run() {
        let report = ReconcileReport::new(
            Tool::Ruff,
            PathBuf::from("pyproject.toml"),
            vec![],
            vec![],
            vec![],
        );
        let output = format_terminal(&report);
        assert!(output.contains("No exclusions needed"));
        assert!(!output.contains("No longer excluded"));
    }

    #[test]
    fn test_format_markdown() {
        let report = create_test_report();
        let output = format_markdown(&report);

        assert!(output.contains("# debtcloset - Exclusion Report"));
        assert!(output.contains("**Excluded**: 3"));
        assert!(output.contains("| `.tox/*` | ignore | new |"));
        assert!(output.contains("| `src/module1.py` | failing | kept |"));
        assert!(output.contains("## No Longer Excluded"));
    }

    #[test]
    fn test_format_json() {
        let report = create_test_report();
        let output = format_json(&report).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["tool"], "pyright");
        assert_eq!(parsed["exclusions"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["exclusions"][0], ".tox/*");
    }
}
