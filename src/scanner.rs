use crate::error::DebtError;
use crate::models::{ReportSchema, ToolProfile};
use crate::process;
use crate::reconcile::write_exclusions;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Lines of tool stderr attached to a report parse failure
const STDERR_TAIL_LINES: usize = 20;

/// Runs one analysis tool against a repository and collects failing files
pub struct Scanner<'a> {
    profile: &'a ToolProfile,
    config_file: &'a str,
    timeout: Option<Duration>,
}

impl<'a> Scanner<'a> {
    pub fn new(profile: &'a ToolProfile, config_file: &'a str, timeout: Option<Duration>) -> Self {
        Self {
            profile,
            config_file,
            timeout,
        }
    }

    /// Scan `repo_root` with `staged` temporarily written as the exclusion list.
    ///
    /// Returns the distinct failing files relative to the root, forward-slash
    /// separated and sorted. The staged list is cleared again afterwards, also
    /// when the tool or its report fails.
    pub fn scan(&self, repo_root: &Path, staged: &[String]) -> Result<Vec<String>> {
        let config_path = repo_root.join(self.config_file);

        debug!(tool = %self.profile.name, staged = staged.len(), "staging exclusions");
        write_exclusions(&config_path, self.profile, staged)
            .context("Failed to stage exclusions")?;

        let outcome = self.run(repo_root);
        let restore = write_exclusions(&config_path, self.profile, &[])
            .context("Failed to clear staged exclusions");

        match (outcome, restore) {
            (Ok(paths), Ok(())) => Ok(paths),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                warn!(err = %restore_err, "staged exclusions left in place");
                Err(err)
            }
        }
    }

    fn run(&self, repo_root: &Path) -> Result<Vec<String>> {
        let root = repo_root
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", repo_root.display()))?;
        let args = self.profile.command_for(&root.to_string_lossy());

        let report = NamedTempFile::new().context("Failed to create report file")?;
        let stderr = NamedTempFile::new().context("Failed to create tool log file")?;

        info!(tool = %self.profile.name, root = %root.display(), "running analysis tool");
        process::run_to_files(&args, &root, report.as_file(), stderr.as_file(), self.timeout)?;

        let text = fs::read_to_string(report.path()).context("Failed to read tool report")?;
        let failing = parse_report(&self.profile.report, &self.profile.name, &text).map_err(
            |err| match err {
                DebtError::MalformedReport { tool, reason } => DebtError::MalformedReport {
                    tool,
                    reason: with_stderr_tail(reason, stderr.path()),
                },
                other => other,
            },
        )?;

        let relative: BTreeSet<String> = failing
            .iter()
            .map(|path| relativize(&root, repo_root, path))
            .collect();

        info!(tool = %self.profile.name, failing = relative.len(), "scan finished");
        Ok(relative.into_iter().collect())
    }
}

/// Distinct paths of the records in `text` that count as failures
pub fn parse_report(
    schema: &ReportSchema,
    tool: &str,
    text: &str,
) -> Result<BTreeSet<String>, DebtError> {
    let malformed = |reason: String| DebtError::MalformedReport {
        tool: tool.to_string(),
        reason,
    };

    let report: Value =
        serde_json::from_str(text).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    let records = if schema.records.is_empty() {
        &report
    } else {
        report
            .pointer(&schema.records)
            .ok_or_else(|| malformed(format!("missing `{}`", schema.records)))?
    };

    let records = match records {
        Value::Null => return Ok(BTreeSet::new()),
        Value::Array(items) => items,
        _ => return Err(malformed("diagnostics are not a list".to_string())),
    };

    let mut paths = BTreeSet::new();
    for record in records {
        if let Some(ref filter) = schema.severity {
            let level = record.get(&filter.field).and_then(Value::as_str);
            if level != Some(filter.level.as_str()) {
                continue;
            }
        }

        let path = record
            .get(&schema.path_field)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(format!("record without `{}`", schema.path_field)))?;
        paths.insert(path.to_string());
    }

    Ok(paths)
}

/// Express `path` relative to the repository root with `/` separators
pub fn relativize(root: &Path, given_root: &Path, path: &str) -> String {
    let full = Path::new(path);
    let relative = full
        .strip_prefix(root)
        .or_else(|_| full.strip_prefix(given_root))
        .unwrap_or(full);

    if relative.is_absolute() {
        warn!(path, "reported file lies outside the repository");
        return relative.to_string_lossy().replace('\\', "/");
    }

    let parts: Vec<String> = relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    parts.join("/").replace('\\', "/")
}

fn with_stderr_tail(reason: String, stderr_path: &Path) -> String {
    let Ok(stderr) = fs::read_to_string(stderr_path) else {
        return reason;
    };

    let lines: Vec<&str> = stderr.lines().collect();
    if lines.is_empty() {
        return reason;
    }

    let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
    format!("{}\ntool stderr:\n{}", reason, tail)
}
