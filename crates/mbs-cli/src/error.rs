//! Error types for mbs-cli

use mbs_assembly::AssemblyError;
use mbs_link::LinkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScenarioError>;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{what}: row {row} has {found} values, expected {expected}")]
    RaggedBlock {
        what: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("constraint {index} ({name}): {source}")]
    Link {
        index: usize,
        name: String,
        source: LinkError,
    },

    #[error("unknown backend: {0} (expected csr, triplet or dense)")]
    UnknownBackend(String),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}
