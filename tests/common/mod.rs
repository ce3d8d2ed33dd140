#![allow(dead_code)]

use debtcloset::models::{Config, Tool, ToolOverride};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Stands in for pyright: files containing `type error` fail with error
/// severity, files containing `warning only` get a warning.
pub const FAKE_PYRIGHT: &str = r#"root=$(pwd -P)
printf '{"generalDiagnostics":['
sep=''
for f in $(grep -rl --include='*.py' 'type error' . | sort); do
  printf '%s{"file":"%s/%s","severity":"error"}' "$sep" "$root" "${f#./}"
  sep=','
done
for f in $(grep -rl --include='*.py' 'warning only' . | sort); do
  printf '%s{"file":"%s/%s","severity":"warning"}' "$sep" "$root" "${f#./}"
  sep=','
done
printf ']}'
"#;

/// Stands in for ruff: every file containing `lint error` is reported
pub const FAKE_RUFF: &str = r#"printf '['
sep=''
for f in $(grep -rl --include='*.py' 'lint error' "$1" | sort); do
  printf '%s{"filename":"%s","code":"F401"}' "$sep" "$f"
  sep=','
done
printf ']'
"#;

pub const PYPROJECT: &str = r#"[build-system]
requires = ["setuptools"]

[tool.pyright]

[tool.faketool]
option = "keep me"
"#;

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn read_pyproject(root: &Path) -> String {
    fs::read_to_string(root.join("pyproject.toml")).unwrap()
}

/// Repository with two failing modules and one clean module under `src/`
pub fn failing_repo(pyproject: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pyproject.toml", pyproject);
    write(dir.path(), "src/module1.py", "x: int = 'type error'\n");
    write(dir.path(), "src/module2.py", "y: str = 2  # type error\n");
    write(dir.path(), "src/module3.py", "z = 3  # warning only\n");
    dir
}

fn sh(script: &str, extra: &[&str]) -> Vec<String> {
    let mut command = vec!["sh".to_string(), "-c".to_string(), script.to_string()];
    command.extend(extra.iter().map(|s| s.to_string()));
    command
}

/// Default configuration with the fake tools swapped in
pub fn fake_config() -> Config {
    let mut config = Config::default();
    config.tools.insert(
        Tool::Pyright.name().to_string(),
        ToolOverride {
            command: Some(sh(FAKE_PYRIGHT, &[])),
            ..ToolOverride::default()
        },
    );
    config.tools.insert(
        Tool::Ruff.name().to_string(),
        ToolOverride {
            // `sh -c script name arg`: `$1` is the repository root
            command: Some(sh(FAKE_RUFF, &["ruff", "{root}"])),
            ..ToolOverride::default()
        },
    );
    config
}

/// Config whose pyright command is an arbitrary shell script
pub fn config_with_pyright(script: &str) -> Config {
    let mut config = Config::default();
    config.tools.insert(
        Tool::Pyright.name().to_string(),
        ToolOverride {
            command: Some(sh(script, &[])),
            ..ToolOverride::default()
        },
    );
    config
}
