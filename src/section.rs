use crate::error::DebtError;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use tempfile::NamedTempFile;

/// Marks the start of the next top-level section
const NEXT_SECTION: &str = "\n[";

/// Find the byte span of the section introduced by `header`.
///
/// The span starts at the first literal occurrence of `header` and ends where
/// the next line begins with `[`, or at the end of the text. `header` must be
/// fully bracketed (`[tool.ruff]`, not `tool.ruff`) or it may match a longer
/// header that shares its prefix.
pub fn locate(text: &str, header: &str) -> Result<Range<usize>, DebtError> {
    let start = text.find(header).ok_or_else(|| DebtError::SectionNotFound {
        header: header.to_string(),
    })?;

    let body = start + header.len();
    let end = text[body..]
        .find(NEXT_SECTION)
        .map_or(text.len(), |offset| body + offset);

    Ok(start..end)
}

/// Text of a configuration document.
///
/// Edits return a new `Document`; everything outside the edited section is
/// carried over byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    content: String,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Read a document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(content))
    }

    /// Write the document over `path`.
    ///
    /// The text goes to a temporary file in the same directory first and is
    /// renamed over the target, so readers never see a half-written file.
    /// A symlinked `path` is resolved first, so the link survives and the file
    /// it points at is the one replaced. An existing file keeps its permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        staged
            .write_all(self.content.as_bytes())
            .context("Failed to write temporary file")?;

        if let Ok(metadata) = fs::metadata(&target) {
            staged
                .as_file()
                .set_permissions(metadata.permissions())
                .with_context(|| format!("Failed to copy permissions of {}", target.display()))?;
        }

        staged
            .persist(&target)
            .with_context(|| format!("Failed to replace {}", target.display()))?;

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_string(self) -> String {
        self.content
    }

    pub fn has_section(&self, header: &str) -> bool {
        self.content.contains(header)
    }

    /// Append an empty `header` section, separated by a blank line, unless one exists
    pub fn ensure_section(self, header: &str) -> Self {
        if self.has_section(header) {
            return self;
        }
        Self::new(format!("{}\n{}\n", self.content, header))
    }

    /// Text of the section, header included
    pub fn section(&self, header: &str) -> Result<&str, DebtError> {
        let span = locate(&self.content, header)?;
        Ok(&self.content[span])
    }

    /// Swap the section's text for `section`
    pub fn replace_section(&self, header: &str, section: &str) -> Result<Self, DebtError> {
        let span = locate(&self.content, header)?;
        let mut content = String::with_capacity(self.content.len() + section.len());
        content.push_str(&self.content[..span.start]);
        content.push_str(section);
        content.push_str(&self.content[span.end..]);
        Ok(Self::new(content))
    }
}
