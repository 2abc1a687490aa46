//! Dense backend over nalgebra `DMatrix`.
//!
//! Useful for small systems and as the reference "dense-equivalent view" when
//! checking sparse backends. Every cell is stored, so there is no CSR view.

use crate::error::{check_index, Result, SparseError};
use crate::matrix::SparseMatrix;
use crate::symmetry::SymmetryType;
use nalgebra::DMatrix;

/// Default limit on the cell count a dense matrix may be resized to (2 GiB of `f64`).
pub const DEFAULT_DENSE_MAX_ELEMENTS: usize = 1 << 28;

#[derive(Debug, Clone)]
pub struct DenseMatrix {
    data: DMatrix<f64>,
    symmetry: SymmetryType,
    max_elements: usize,
}

impl DenseMatrix {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self::from(DMatrix::zeros(nrows, ncols))
    }

    /// Limit the cell count accepted by `resize`.
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    pub fn max_elements(&self) -> usize {
        self.max_elements
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.data
    }
}

impl From<DMatrix<f64>> for DenseMatrix {
    fn from(data: DMatrix<f64>) -> Self {
        Self {
            data,
            symmetry: SymmetryType::General,
            max_elements: DEFAULT_DENSE_MAX_ELEMENTS,
        }
    }
}

impl SparseMatrix for DenseMatrix {
    fn nrows(&self) -> usize {
        self.data.nrows()
    }

    fn ncols(&self) -> usize {
        self.data.ncols()
    }

    fn symmetry(&self) -> SymmetryType {
        self.symmetry
    }

    fn set_symmetry(&mut self, symmetry: SymmetryType) {
        self.symmetry = symmetry;
    }

    fn set_element(&mut self, row: usize, col: usize, value: f64, overwrite: bool) -> Result<()> {
        check_index(row, col, self.data.nrows(), self.data.ncols())?;
        if overwrite {
            self.data[(row, col)] = value;
        } else {
            self.data[(row, col)] += value;
        }
        Ok(())
    }

    fn get_element(&self, row: usize, col: usize) -> Result<f64> {
        check_index(row, col, self.data.nrows(), self.data.ncols())?;
        Ok(self.data[(row, col)])
    }

    fn reset(&mut self, nrows: usize, ncols: usize, _nonzeros: usize) {
        self.data = DMatrix::zeros(nrows, ncols);
    }

    fn resize(&mut self, nrows: usize, ncols: usize, nonzeros: usize) -> Result<()> {
        let failure = SparseError::AllocationFailure {
            nrows,
            ncols,
            nonzeros,
        };
        let len = nrows
            .checked_mul(ncols)
            .filter(|&len| len <= self.max_elements)
            .ok_or_else(|| failure.clone())?;
        let mut storage: Vec<f64> = Vec::new();
        storage.try_reserve_exact(len).map_err(|_| failure)?;
        storage.resize(len, 0.0);

        let mut data = DMatrix::from_vec(nrows, ncols, storage);
        let keep_rows = nrows.min(self.data.nrows());
        let keep_cols = ncols.min(self.data.ncols());
        data.view_mut((0, 0), (keep_rows, keep_cols))
            .copy_from(&self.data.view((0, 0), (keep_rows, keep_cols)));
        self.data = data;
        Ok(())
    }
}
