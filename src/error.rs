//! Error types for consuming control-dependence analysis input.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building control dependence graphs from analysis
/// output.
///
/// Precondition violations during the search itself (unknown code unit,
/// target missing from its graph) are not represented here: they panic,
/// because the analysis input is assumed to be internally consistent once
/// it has been accepted.
#[derive(Debug, Error)]
pub enum CdgError {
    /// The input is not valid JSON for the expected record.
    #[error("malformed {context}: {source}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// An edge references a node position outside the `nodes` array.
    #[error("edge {from} -> {to} in `{code_unit}` is out of bounds ({nodes} nodes)")]
    EdgeOutOfBounds {
        code_unit: String,
        from: usize,
        to: usize,
        nodes: usize,
    },

    /// The same block id was listed twice for one code unit.
    #[error("block {block} appears more than once in `{code_unit}`")]
    DuplicateBlock { code_unit: String, block: u64 },

    /// No node carries the root sentinel id.
    #[error("`{code_unit}` has no root sentinel node")]
    MissingRoot { code_unit: String },

    /// A vertex has no path from the root sentinel.
    #[error("block {block} in `{code_unit}` is unreachable from the root")]
    Unreachable { code_unit: String, block: u64 },

    /// Two inputs describe the same code unit.
    #[error("code unit `{code_unit}` was registered twice")]
    DuplicateCodeUnit { code_unit: String },

    /// Reading a log file or directory failed.
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results carrying a [`CdgError`].
pub type CdgResult<T> = Result<T, CdgError>;
