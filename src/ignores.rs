use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Baseline exclusions for a repository.
///
/// Each of `default_dirs` that currently exists as a directory under
/// `repo_root` contributes `<dir>/*`. The result is merged with `required`,
/// de-duplicated and sorted.
pub fn resolve_default_ignores(
    repo_root: &Path,
    default_dirs: &[String],
    required: &[String],
) -> Vec<String> {
    let mut ignores: BTreeSet<String> = required.iter().cloned().collect();

    for dir in default_dirs {
        let dir = dir.trim_end_matches('/');
        if repo_root.join(dir).is_dir() {
            debug!(dir, "ignoring existing directory");
            ignores.insert(format!("{}/*", dir));
        }
    }

    ignores.into_iter().collect()
}

/// Matches paths already excluded by a set of exclusion entries
pub struct Coverage {
    globs: GlobSet,
    prefixes: Vec<String>,
}

impl Coverage {
    /// Entries are treated both as globs and as directory prefixes.
    ///
    /// An entry that is not a valid glob still works as a prefix.
    pub fn new(entries: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut prefixes = Vec::new();

        for entry in entries {
            match GlobBuilder::new(entry).literal_separator(false).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!(entry = entry.as_str(), err = %e, "exclusion is not a valid glob"),
            }

            let dir = entry.trim_end_matches("/*").trim_end_matches('/');
            if !dir.is_empty() {
                prefixes.push(format!("{}/", dir));
            }
        }

        let globs = builder.build().unwrap_or_else(|e| {
            warn!(err = %e, "failed to compile exclusion globs");
            GlobSet::empty()
        });

        Self { globs, prefixes }
    }

    pub fn covers(&self, path: &str) -> bool {
        self.globs.is_match(path) || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Drop discovered paths already covered by `entries`
pub fn drop_covered(discovered: Vec<String>, entries: &[String]) -> Vec<String> {
    let coverage = Coverage::new(entries);

    discovered
        .into_iter()
        .filter(|path| {
            let covered = coverage.covers(path);
            if covered {
                debug!(path = path.as_str(), "already covered by an exclusion");
            }
            !covered
        })
        .collect()
}
