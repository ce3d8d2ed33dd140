use crate::error::DebtError;
use crate::exclusions::ExclusionCodec;
use crate::ignores::{drop_covered, resolve_default_ignores};
use crate::models::{Config, ReconcileReport, Tool, ToolProfile};
use crate::scanner::Scanner;
use crate::section::Document;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Load `config_path`, make sure the tool's section and key exist, run `edit`
/// on the section text and save the result.
///
/// Returns the list that was assigned before the edit.
fn edit_exclusions<F>(config_path: &Path, profile: &ToolProfile, edit: F) -> Result<Vec<String>>
where
    F: FnOnce(&ExclusionCodec, &str) -> Result<String, DebtError>,
{
    let document = Document::load(config_path)?.ensure_section(&profile.header);
    let codec = ExclusionCodec::new(profile.exclude_key.as_str());
    let section = codec.ensure_key(document.section(&profile.header)?);

    let previous = codec.current(&section).unwrap_or_else(|e| {
        warn!(err = %e, key = codec.key(), "could not read existing exclusions");
        Vec::new()
    });

    let edited = edit(&codec, &section)?;
    document
        .replace_section(&profile.header, &edited)?
        .save(config_path)?;

    Ok(previous)
}

/// Set the exclusion list in `config_path`; an empty `paths` clears it
pub(crate) fn write_exclusions(
    config_path: &Path,
    profile: &ToolProfile,
    paths: &[String],
) -> Result<()> {
    edit_exclusions(config_path, profile, |codec, section| codec.add(section, paths))?;
    Ok(())
}

/// Remove the tool's exclusion list, returning what it held
pub fn remove_exclusions(
    repo_root: &Path,
    profile: &ToolProfile,
    config_file: &str,
) -> Result<Vec<String>> {
    edit_exclusions(&repo_root.join(config_file), profile, |codec, section| {
        codec.remove(section)
    })
}

/// Replace the tool's exclusion list with `paths`
pub fn add_exclusions(
    repo_root: &Path,
    profile: &ToolProfile,
    config_file: &str,
    paths: &[String],
) -> Result<()> {
    write_exclusions(&repo_root.join(config_file), profile, paths)
}

/// Exclusions currently configured for the tool, without touching the file
pub fn current_exclusions(
    repo_root: &Path,
    profile: &ToolProfile,
    config_file: &str,
) -> Result<Vec<String>> {
    let document = Document::load(&repo_root.join(config_file))?;
    if !document.has_section(&profile.header) {
        return Ok(Vec::new());
    }

    let section = document.section(&profile.header)?;
    ExclusionCodec::new(profile.exclude_key.as_str()).current(section)
}

/// Rewrite the tool's exclusion list to match what currently fails.
///
/// Clears the existing list, scans the repository with the default and
/// required ignores staged, then writes the union of those ignores and the
/// failing files that are not already covered by them.
pub fn reconcile(
    repo_root: &Path,
    tool: Tool,
    required: &[String],
    config: &Config,
) -> Result<ReconcileReport> {
    let config_path = repo_root.join(&config.config_file);
    if !config_path.is_file() {
        return Err(DebtError::ConfigNotFound(config_path).into());
    }

    let profile = config.profile(tool);
    info!(tool = %tool, config = %config_path.display(), "reconciling exclusions");

    let previous = remove_exclusions(repo_root, &profile, &config.config_file)
        .context("Failed to clear existing exclusions")?;

    let ignores = resolve_default_ignores(repo_root, &config.default_ignore_dirs, required);

    let scanner = Scanner::new(&profile, &config.config_file, config.timeout());
    let failing = scanner
        .scan(repo_root, &ignores)
        .with_context(|| format!("Failed to scan with {}", tool))?;
    let discovered = drop_covered(failing, &ignores);

    let report = ReconcileReport::new(tool, config_path, previous, ignores, discovered);
    if !report.exclusions.is_empty() {
        add_exclusions(repo_root, &profile, &config.config_file, &report.exclusions)
            .context("Failed to write exclusions")?;
    }

    info!(
        tool = %tool,
        excluded = report.exclusions.len(),
        added = report.added().len(),
        removed = report.removed().len(),
        "exclusions reconciled"
    );
    Ok(report)
}

/// Exclude every file pyright reports an error for, plus `required`
pub fn exclude_pyright(repo_root: &Path, required: Option<&[String]>) -> Result<ReconcileReport> {
    reconcile(
        repo_root,
        Tool::Pyright,
        required.unwrap_or_default(),
        &Config::default(),
    )
}

/// Exclude every file ruff reports a violation for
pub fn exclude_ruff(repo_root: &Path) -> Result<ReconcileReport> {
    reconcile(repo_root, Tool::Ruff, &[], &Config::default())
}
