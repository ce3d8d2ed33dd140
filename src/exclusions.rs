use crate::error::DebtError;
use anyhow::{Context, Result, anyhow};

/// Indentation for each entry of a rendered list
const INDENT: &str = "    ";

/// Edits one exclusion key inside a section's text.
///
/// The list is handled as a text span rather than parsed and re-serialized,
/// so comments and formatting elsewhere in the section are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionCodec {
    key: String,
}

impl ExclusionCodec {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Offset of the newline that starts the key's line, if the key is assigned
    fn find_key(&self, section: &str) -> Option<usize> {
        let needle = format!("\n{}", self.key);
        section.match_indices(&needle).map(|(i, _)| i).find(|&i| {
            section[i + needle.len()..]
                .trim_start_matches([' ', '\t'])
                .starts_with('=')
        })
    }

    /// Span from the key's leading newline to the end of its value
    fn span(&self, section: &str) -> Result<(usize, usize), DebtError> {
        let start = self.find_key(section).ok_or_else(|| DebtError::KeyNotFound {
            key: self.key.clone(),
        })?;

        let unterminated = || DebtError::UnterminatedValue {
            key: self.key.clone(),
        };

        // find_key guarantees an `=` follows the key
        let eq = start + section[start..].find('=').ok_or_else(unterminated)?;
        let after_eq = eq + 1;
        let value = section[after_eq..].trim_start_matches([' ', '\t']);
        let value_start = section.len() - value.len();

        let end = if value.starts_with('[') {
            array_end(section, value_start).ok_or_else(unterminated)?
        } else {
            section[value_start..]
                .find('\n')
                .map_or(section.len(), |offset| value_start + offset)
        };

        Ok((start, end))
    }

    /// Append an empty list for the key unless it is already assigned
    pub fn ensure_key(&self, section: &str) -> String {
        if self.find_key(section).is_some() {
            return section.to_string();
        }
        format!("{}\n{} = []", section, self.key)
    }

    /// Delete the key and its list from the section
    pub fn remove(&self, section: &str) -> Result<String, DebtError> {
        let (start, end) = self.span(section)?;
        Ok(format!("{}{}", &section[..start], &section[end..]))
    }

    /// Replace any existing list with `paths`, sorted.
    ///
    /// An empty `paths` only removes the existing list; `key = []` is never written.
    pub fn add(&self, section: &str, paths: &[String]) -> Result<String, DebtError> {
        let mut content = self.remove(section)?;
        if paths.is_empty() {
            return Ok(content);
        }

        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&self.render(paths));
        Ok(content)
    }

    /// `key = [ ... ]` with one quoted entry per line, followed by a newline
    pub fn render(&self, paths: &[String]) -> String {
        let mut sorted: Vec<&String> = paths.iter().collect();
        sorted.sort();

        let lines: Vec<String> = sorted
            .into_iter()
            .map(|path| format!("{}{},", INDENT, quote(path)))
            .collect();

        format!("{} = [\n{}\n]\n", self.key, lines.join("\n"))
    }

    /// Entries currently assigned to the key; empty when the key is absent
    pub fn current(&self, section: &str) -> Result<Vec<String>> {
        let (start, end) = match self.span(section) {
            Ok(span) => span,
            Err(DebtError::KeyNotFound { .. }) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let assignment = section[start..end].trim_start();
        let table: toml::Table = toml::from_str(assignment)
            .with_context(|| format!("Failed to parse `{}` list", self.key))?;

        let value = table
            .get(&self.key)
            .ok_or_else(|| anyhow!("`{}` has no value", self.key))?;
        let items = value
            .as_array()
            .ok_or_else(|| anyhow!("`{}` is not a list", self.key))?;

        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("`{}` contains a non-string entry", self.key))
            })
            .collect()
    }
}

/// Render a path as a TOML string literal
fn quote(path: &str) -> String {
    toml::Value::String(path.to_string()).to_string()
}

/// Offset just past the `]` that closes the array opening at `open`.
///
/// Brackets inside strings and comments do not count.
fn array_end(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut chars = text[open..].char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i + 1);
                }
            }
            '"' | '\'' => {
                while let Some((_, s)) = chars.next() {
                    if c == '"' && s == '\\' {
                        chars.next();
                    } else if s == c {
                        break;
                    }
                }
            }
            '#' => {
                for (_, s) in chars.by_ref() {
                    if s == '\n' {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    None
}
