//! Error types for mbs-assembly

use mbs_sparse::SparseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssemblyError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error(transparent)]
    Sparse(#[from] SparseError),

    #[error("constraint {index} ({name}): Jacobian block has {found} rows, link has {expected} coordinates")]
    BlockRowMismatch {
        index: usize,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "constraint {index} ({name}): {cols} columns at offset {col_offset} exceed {num_vars} variables"
    )]
    BlockColumnsOutOfRange {
        index: usize,
        name: String,
        col_offset: usize,
        cols: usize,
        num_vars: usize,
    },

    #[error("body {body}: {rows}x{cols} mass block at offset {offset} does not fit {num_vars} variables")]
    InvalidMassBlock {
        body: usize,
        offset: usize,
        rows: usize,
        cols: usize,
        num_vars: usize,
    },
}
