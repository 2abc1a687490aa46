//! Concrete storage backends.
//!
//! Each backend implements only the element-level primitives of
//! [`SparseMatrix`](crate::SparseMatrix); block placement comes from
//! [`SparseMatrixExt`](crate::SparseMatrixExt).

pub mod csr;
pub mod dense;
pub mod triplet;

pub use csr::CsrSparseMatrix;
pub use dense::{DenseMatrix, DEFAULT_DENSE_MAX_ELEMENTS};
pub use triplet::TripletMatrix;
