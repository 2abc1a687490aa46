//! Hash-map backed sparse matrix.
//!
//! Insertion-friendly storage for assembly: entries can be written in any
//! order and accumulate in place. The matrix has no compressed-row view;
//! use [`TripletMatrix::to_csr`] to hand it to a solver.

use crate::error::{check_index, Result, SparseError};
use crate::matrix::SparseMatrix;
use crate::symmetry::SymmetryType;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::collections::HashMap;

/// Sparse matrix storing `(row, col) -> value` entries.
#[derive(Debug, Clone, Default)]
pub struct TripletMatrix {
    nrows: usize,
    ncols: usize,
    symmetry: SymmetryType,
    entries: HashMap<(usize, usize), f64>,
}

impl TripletMatrix {
    /// Create an empty `nrows × ncols` matrix.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            symmetry: SymmetryType::General,
            entries: HashMap::new(),
        }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Stored entries sorted row-major.
    pub fn sorted_entries(&self) -> Vec<(usize, usize, f64)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|(&(row, col), &value)| (row, col, value))
            .collect();
        out.sort_by_key(|&(row, col, _)| (row, col));
        out
    }

    /// Export as nalgebra-sparse COO triplets.
    pub fn to_coo(&self) -> CooMatrix<f64> {
        let mut coo = CooMatrix::new(self.nrows, self.ncols);
        for (row, col, value) in self.sorted_entries() {
            coo.push(row, col, value);
        }
        coo
    }

    /// Export as an owned nalgebra-sparse CSR matrix.
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        CsrMatrix::from(&self.to_coo())
    }
}

impl SparseMatrix for TripletMatrix {
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn symmetry(&self) -> SymmetryType {
        self.symmetry
    }

    fn set_symmetry(&mut self, symmetry: SymmetryType) {
        self.symmetry = symmetry;
    }

    fn set_element(&mut self, row: usize, col: usize, value: f64, overwrite: bool) -> Result<()> {
        check_index(row, col, self.nrows, self.ncols)?;
        if overwrite {
            self.entries.insert((row, col), value);
        } else {
            *self.entries.entry((row, col)).or_insert(0.0) += value;
        }
        Ok(())
    }

    fn get_element(&self, row: usize, col: usize) -> Result<f64> {
        check_index(row, col, self.nrows, self.ncols)?;
        Ok(self.entries.get(&(row, col)).copied().unwrap_or(0.0))
    }

    fn reset(&mut self, nrows: usize, ncols: usize, nonzeros: usize) {
        self.nrows = nrows;
        self.ncols = ncols;
        self.entries.clear();
        if self.entries.try_reserve(nonzeros).is_err() {
            tracing::warn!(nonzeros, "ignoring nonzero hint that cannot be reserved");
        }
    }

    fn resize(&mut self, nrows: usize, ncols: usize, nonzeros: usize) -> Result<()> {
        let additional = nonzeros.saturating_sub(self.entries.len());
        self.entries
            .try_reserve(additional)
            .map_err(|_| SparseError::AllocationFailure {
                nrows,
                ncols,
                nonzeros,
            })?;

        self.entries.retain(|&(row, col), _| row < nrows && col < ncols);
        self.nrows = nrows;
        self.ncols = ncols;
        Ok(())
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(usize, usize, f64)) {
        for (row, col, value) in self.sorted_entries() {
            visit(row, col, value);
        }
    }
}
