//! Sparse system matrices for multibody assembly.
//!
//! This crate defines the contract every sparse storage backend must satisfy
//! and the block paste algorithms built on top of it:
//! - **Primitives** (`SparseMatrix`): element set/get, reset, resize
//! - **Paste algorithms** (`SparseMatrixExt`): plain, transposed, accumulated
//!   and clipped block placement, inherited by every backend
//! - **Symmetry hint** (`SymmetryType`): advisory metadata for solvers
//! - **CSR export** (`CsrExport`): optional capability for backends that keep
//!   compressed-row arrays
//!
//! ## Backends
//!
//! | Backend | Storage | CSR view |
//! |---------|---------|----------|
//! | `TripletMatrix` | hash map keyed by (row, col) | no |
//! | `CsrSparseMatrix` | row offsets + sorted column indices | yes |
//! | `DenseMatrix` | nalgebra `DMatrix` | no |

pub mod backends;
pub mod block;
pub mod error;
pub mod matrix;
pub mod symmetry;

pub use backends::{CsrSparseMatrix, DenseMatrix, TripletMatrix, DEFAULT_DENSE_MAX_ELEMENTS};
pub use block::DenseBlock;
pub use error::{check_index, Result, SparseError};
pub use matrix::{
    estimate_nonzeros, CsrExport, SparseMatrix, SparseMatrixExt, DEFAULT_FULLNESS,
    DEFAULT_MAX_ELEMENTS,
};
pub use symmetry::SymmetryType;
