use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// External analysis tools with a built-in integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Type checker; only `error` severity diagnostics count as debt
    Pyright,
    /// Linter; every reported violation counts as debt
    Ruff,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Pyright => "pyright",
            Tool::Ruff => "ruff",
        }
    }

    /// Built-in integration for this tool
    pub fn profile(self) -> ToolProfile {
        match self {
            Tool::Pyright => ToolProfile {
                name: "pyright".to_string(),
                header: "[tool.pyright]".to_string(),
                exclude_key: "exclude".to_string(),
                command: vec!["pyright".to_string(), "--outputjson".to_string()],
                report: ReportSchema {
                    records: "/generalDiagnostics".to_string(),
                    path_field: "file".to_string(),
                    severity: Some(SeverityFilter {
                        field: "severity".to_string(),
                        level: "error".to_string(),
                    }),
                },
            },
            Tool::Ruff => ToolProfile {
                name: "ruff".to_string(),
                header: "[tool.ruff]".to_string(),
                exclude_key: "extend-exclude".to_string(),
                command: vec![
                    "ruff".to_string(),
                    "check".to_string(),
                    ROOT_PLACEHOLDER.to_string(),
                    "--output-format=json".to_string(),
                ],
                report: ReportSchema {
                    records: String::new(),
                    path_field: "filename".to_string(),
                    severity: None,
                },
            },
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Replaced by the repository root in tool command arguments
pub const ROOT_PLACEHOLDER: &str = "{root}";

/// Everything needed to stage exclusions for one tool, run it, and read its report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolProfile {
    /// Name used in logs and error messages
    pub name: String,

    /// Fully bracketed section header, e.g. `[tool.pyright]`
    pub header: String,

    /// Key holding the exclusion list inside the section
    pub exclude_key: String,

    /// Program followed by its arguments
    pub command: Vec<String>,

    /// Shape of the tool's JSON report
    pub report: ReportSchema,
}

impl ToolProfile {
    /// Command arguments with `{root}` substituted
    pub fn command_for(&self, root: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| arg.replace(ROOT_PLACEHOLDER, root))
            .collect()
    }

    fn apply(mut self, overrides: &ToolOverride) -> Self {
        if let Some(ref command) = overrides.command {
            self.command = command.clone();
        }
        if let Some(ref header) = overrides.header {
            self.header = header.clone();
        }
        if let Some(ref key) = overrides.exclude_key {
            self.exclude_key = key.clone();
        }
        self
    }
}

/// Where diagnostic records live in a report and which fields matter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSchema {
    /// JSON pointer to the record array; empty when the report itself is the array
    pub records: String,

    /// Record field holding the (usually absolute) file path
    pub path_field: String,

    /// When set, only records passing the filter count as failures
    pub severity: Option<SeverityFilter>,
}

/// Keeps records whose `field` equals `level`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityFilter {
    pub field: String,
    pub level: String,
}

/// Per-tool settings that may be overridden from the config file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolOverride {
    pub command: Option<Vec<String>>,
    pub header: Option<String>,
    pub exclude_key: Option<String>,
}

/// Configuration for debtcloset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Document edited under the repository root
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Directories excluded whenever they exist under the repository root
    #[serde(default = "default_ignore_dirs")]
    pub default_ignore_dirs: Vec<String>,

    /// Seconds to wait for the analysis tool; 0 waits forever
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Overrides keyed by tool name (`pyright`, `ruff`)
    #[serde(default)]
    pub tools: HashMap<String, ToolOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            default_ignore_dirs: default_ignore_dirs(),
            timeout_secs: default_timeout_secs(),
            tools: HashMap::new(),
        }
    }
}

impl Config {
    /// Built-in profile for `tool` with any configured overrides applied
    pub fn profile(&self, tool: Tool) -> ToolProfile {
        let profile = tool.profile();
        match self.tools.get(tool.name()) {
            Some(overrides) => profile.apply(overrides),
            None => profile,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn default_config_file() -> String {
    "pyproject.toml".to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    vec![
        ".venv".to_string(),
        "venv".to_string(),
        ".tox".to_string(),
        ".nox".to_string(),
        "dist".to_string(),
        "build".to_string(),
        "site".to_string(),
        "docs/_build".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    600
}

/// Outcome of one reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Tool whose section was reconciled
    pub tool: Tool,

    /// Document that was rewritten
    pub config_path: PathBuf,

    /// Exclusion list before the run
    pub previous: Vec<String>,

    /// Existing default directories plus required exclusions
    pub ignores: Vec<String>,

    /// Files the tool reported as failing
    pub discovered: Vec<String>,

    /// Exclusion list written back
    pub exclusions: Vec<String>,

    /// When the reconciliation finished
    pub reconciled_at: DateTime<Utc>,
}

impl ReconcileReport {
    pub fn new(
        tool: Tool,
        config_path: PathBuf,
        previous: Vec<String>,
        ignores: Vec<String>,
        discovered: Vec<String>,
    ) -> Self {
        let exclusions: BTreeSet<String> =
            ignores.iter().chain(discovered.iter()).cloned().collect();

        Self {
            tool,
            config_path,
            previous,
            ignores,
            discovered,
            exclusions: exclusions.into_iter().collect(),
            reconciled_at: Utc::now(),
        }
    }

    /// Entries present now that were not excluded before
    pub fn added(&self) -> Vec<&str> {
        self.exclusions
            .iter()
            .filter(|entry| !self.previous.contains(entry))
            .map(String::as_str)
            .collect()
    }

    /// Entries excluded before that are no longer needed
    pub fn removed(&self) -> Vec<&str> {
        self.previous
            .iter()
            .filter(|entry| !self.exclusions.contains(entry))
            .map(String::as_str)
            .collect()
    }

    /// Why an entry is in the final list
    pub fn source_of(&self, entry: &str) -> &'static str {
        if self.ignores.iter().any(|e| e == entry) {
            "ignore"
        } else {
            "failing"
        }
    }
}
