//! debtcloset - shut static-analysis debt away
//!
//! Adopting strict pyright or ruff settings on an existing Python project
//! usually means hundreds of pre-existing failures. debtcloset runs the tool,
//! collects the files that fail, and writes them into the tool's exclusion
//! list in `pyproject.toml`, so new code is checked strictly while old debt
//! is paid down file by file.
//!
//! # Features
//!
//! - Edits only the tool's own section; the rest of the document is kept byte for byte
//! - Existing ignore directories (`.venv`, `.tox`, ...) are excluded automatically
//! - Required exclusions (globs) are always present and swallow finer-grained entries
//! - Sorted, one-entry-per-line lists that diff well in review
//! - Reports in terminal, markdown, or JSON format
//!
//! # Example
//!
//! ```rust,no_run
//! use debtcloset::*;
//! use std::path::Path;
//!
//! // Load configuration
//! let config = config::load_config(None).unwrap();
//!
//! // Exclude everything pyright currently rejects, plus a vendored tree
//! let required = vec!["vendored/*".to_string()];
//! let report = reconcile::reconcile(Path::new("."), Tool::Pyright, &required, &config).unwrap();
//!
//! println!("{} exclusions", report.exclusions.len());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod exclusions;
pub mod ignores;
pub mod logging;
pub mod models;
pub mod process;
pub mod reconcile;
pub mod reporter;
pub mod scanner;
pub mod section;

// Re-export commonly used types
pub use error::DebtError;
pub use models::{Config, ReconcileReport, Tool, ToolProfile};
pub use reconcile::{exclude_pyright, exclude_ruff};
