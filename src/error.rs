use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the document editing and report parsing layers.
///
/// Orchestration code wraps these in `anyhow::Error`; use
/// `err.downcast_ref::<DebtError>()` to recover the variant.
#[derive(Debug, Error)]
pub enum DebtError {
    /// The configuration document does not exist under the repository root
    #[error("could not find {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// A section header was expected but is missing from the document
    #[error("section {header} not found in document")]
    SectionNotFound { header: String },

    /// An exclusion key was expected but is missing from the section
    #[error("key `{key}` not found in section")]
    KeyNotFound { key: String },

    /// The key's array value never closes
    #[error("value of key `{key}` is not a terminated list")]
    UnterminatedValue { key: String },

    /// The tool's report did not have the expected shape
    #[error("malformed {tool} report: {reason}")]
    MalformedReport { tool: String, reason: String },

    /// The tool did not exit before the configured timeout
    #[error("{tool} did not finish within {secs}s")]
    ToolTimedOut { tool: String, secs: u64 },
}
