//! Compressed sparse row backend.
//!
//! Keeps genuine CSR arrays at all times, so the storage can be exported to
//! an external factorization without conversion:
//!
//! ```text
//! row_offsets: [0, 2, 3, 5]          (nrows + 1)
//! col_indices: [0, 4 | 1 | 2, 3]     (sorted within each row)
//! values:      [a, b | c | d, e]
//! ```
//!
//! Inserting a new entry shifts the tail of both arrays; the nonzero hint
//! passed to `reset` pre-reserves capacity so assembly does not reallocate
//! repeatedly.

use crate::error::{check_index, Result, SparseError};
use crate::matrix::{estimate_nonzeros, CsrExport, SparseMatrix};
use crate::symmetry::SymmetryType;

#[derive(Debug, Clone)]
pub struct CsrSparseMatrix {
    nrows: usize,
    ncols: usize,
    symmetry: SymmetryType,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl Default for CsrSparseMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl CsrSparseMatrix {
    /// Create an empty matrix with capacity from the default fullness estimate.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self::with_capacity(nrows, ncols, estimate_nonzeros(nrows, ncols))
    }

    /// # Panics
    ///
    /// Panics if `nrows + 1` overflows `usize`.
    pub fn with_capacity(nrows: usize, ncols: usize, nonzeros: usize) -> Self {
        Self {
            nrows,
            ncols,
            symmetry: SymmetryType::General,
            row_offsets: vec![0; row_offsets_len(nrows)],
            col_indices: Vec::with_capacity(nonzeros),
            values: Vec::with_capacity(nonzeros),
        }
    }

    /// Number of stored entries, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Position of `(row, col)` in the entry arrays, or the insertion point.
    fn locate(&self, row: usize, col: usize) -> std::result::Result<usize, usize> {
        let start = self.row_offsets[row];
        let end = self.row_offsets[row + 1];
        self.col_indices[start..end]
            .binary_search(&col)
            .map(|pos| start + pos)
            .map_err(|pos| start + pos)
    }

    fn reserve_entries(&mut self, nonzeros: usize) -> std::result::Result<(), ()> {
        let additional = nonzeros.saturating_sub(self.values.len());
        self.col_indices.try_reserve(additional).map_err(|_| ())?;
        self.values.try_reserve(additional).map_err(|_| ())
    }
}

/// Length of the row pointer array for `nrows` rows.
fn row_offsets_len(nrows: usize) -> usize {
    nrows
        .checked_add(1)
        .unwrap_or_else(|| panic!("{nrows} rows leave no room for the CSR row pointer array"))
}

impl SparseMatrix for CsrSparseMatrix {
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
        match self.locate(row, col) {
            Ok(pos) => {
                if overwrite {
                    self.values[pos] = value;
                } else {
                    self.values[pos] += value;
                }
            }
            Err(pos) => {
                self.col_indices.insert(pos, col);
                self.values.insert(pos, value);
                for offset in &mut self.row_offsets[row + 1..] {
                    *offset += 1;
                }
            }
        }
        Ok(())
    }

    fn get_element(&self, row: usize, col: usize) -> Result<f64> {
        check_index(row, col, self.nrows, self.ncols)?;
        Ok(self.locate(row, col).map_or(0.0, |pos| self.values[pos]))
    }

    fn reset(&mut self, nrows: usize, ncols: usize, nonzeros: usize) {
        let offsets_len = row_offsets_len(nrows);
        self.nrows = nrows;
        self.ncols = ncols;
        self.row_offsets.clear();
        self.row_offsets.resize(offsets_len, 0);
        self.col_indices.clear();
        self.values.clear();
        if self.reserve_entries(nonzeros).is_err() {
            tracing::warn!(nonzeros, "ignoring nonzero hint that cannot be reserved");
        }
    }

    fn resize(&mut self, nrows: usize, ncols: usize, nonzeros: usize) -> Result<()> {
        let failure = SparseError::AllocationFailure {
            nrows,
            ncols,
            nonzeros,
        };

        // Reserve everything up front so nothing is touched on failure.
        let offsets_len = nrows.checked_add(1).ok_or_else(|| failure.clone())?;
        let mut offsets = Vec::new();
        offsets
            .try_reserve_exact(offsets_len)
            .map_err(|_| failure.clone())?;
        self.reserve_entries(nonzeros).map_err(|_| failure)?;

        // Compact surviving entries in place; the write cursor never passes
        // the read cursor.
        offsets.push(0);
        let mut write = 0;
        for row in 0..self.nrows.min(nrows) {
            for read in self.row_offsets[row]..self.row_offsets[row + 1] {
                if self.col_indices[read] < ncols {
                    self.col_indices[write] = self.col_indices[read];
                    self.values[write] = self.values[read];
                    write += 1;
                }
            }
            offsets.push(write);
        }
        offsets.resize(offsets_len, write);
        self.col_indices.truncate(write);
        self.values.truncate(write);

        self.row_offsets = offsets;
        self.nrows = nrows;
        self.ncols = ncols;
        Ok(())
    }

    fn csr_export(&self) -> Option<&dyn CsrExport> {
        Some(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(usize, usize, f64)) {
        for row in 0..self.nrows {
            for pos in self.row_offsets[row]..self.row_offsets[row + 1] {
                visit(row, self.col_indices[pos], self.values[pos]);
            }
        }
    }
}

impl CsrExport for CsrSparseMatrix {
    fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrSparseMatrix {
        // [1 0 2]
        // [0 0 0]
        // [0 3 4]
        let mut m = CsrSparseMatrix::new(3, 3);
        m.set_element(2, 2, 4.0, true).unwrap();
        m.set_element(0, 2, 2.0, true).unwrap();
        m.set_element(2, 1, 3.0, true).unwrap();
        m.set_element(0, 0, 1.0, true).unwrap();
        m
    }

    #[test]
    fn insertion_keeps_rows_sorted() {
        let m = sample();
        assert_eq!(m.row_offsets(), &[0, 2, 2, 4]);
        assert_eq!(m.col_indices(), &[0, 2, 1, 2]);
        assert_eq!(m.values(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.get_element(1, 1).unwrap(), 0.0);
        assert_eq!(m.get_element(2, 1).unwrap(), 3.0);
    }

    #[test]
    fn accumulate_does_not_duplicate_entries() {
        let mut m = sample();
        m.set_element(0, 2, 0.5, false).unwrap();
        m.set_element(1, 0, 7.0, false).unwrap();
        assert_eq!(m.get_element(0, 2).unwrap(), 2.5);
        assert_eq!(m.get_element(1, 0).unwrap(), 7.0);
        assert_eq!(m.nnz(), 5);
        assert_eq!(m.row_offsets(), &[0, 2, 3, 5]);
    }

    #[test]
    fn export_matches_nalgebra_sparse() {
        let m = sample();
        let exported = m.csr_export().expect("csr backend exports");
        let csr = exported.to_csr_matrix().unwrap();
        assert_eq!(csr.nrows(), 3);
        assert_eq!(csr.nnz(), 4);
        assert_eq!(csr.row_offsets(), m.row_offsets());
    }

    #[test]
    fn reset_clears_content_and_reshapes() {
        let mut m = sample();
        m.reset(2, 5, 16);
        assert_eq!((m.nrows(), m.ncols()), (2, 5));
        assert_eq!(m.nnz(), 0);
        assert_eq!(m.row_offsets(), &[0, 0, 0]);
        for row in 0..2 {
            for col in 0..5 {
                assert_eq!(m.get_element(row, col).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn reset_survives_absurd_hint() {
        let mut m = sample();
        m.reset(1, 1, usize::MAX);
        m.set_element(0, 0, 1.0, true).unwrap();
        assert_eq!(m.nnz(), 1);
    }

    #[test]
    #[should_panic(expected = "no room for the CSR row pointer array")]
    fn reset_to_unrepresentable_row_count_panics() {
        let mut m = sample();
        m.reset(usize::MAX, 1, 0);
    }

    #[test]
    #[should_panic(expected = "no room for the CSR row pointer array")]
    fn unrepresentable_row_count_panics_on_construction() {
        let _ = CsrSparseMatrix::with_capacity(usize::MAX, 1, 0);
    }

    #[test]
    fn resize_shrinks_and_grows() {
        let mut m = sample();
        m.resize(3, 2, 0).unwrap();
        assert_eq!(m.row_offsets(), &[0, 1, 1, 2]);
        assert_eq!(m.col_indices(), &[0, 1]);
        assert_eq!(m.values(), &[1.0, 3.0]);

        m.resize(5, 4, 0).unwrap();
        assert_eq!(m.row_offsets(), &[0, 1, 1, 2, 2, 2]);
        m.set_element(4, 3, 6.0, true).unwrap();
        assert_eq!(m.get_element(4, 3).unwrap(), 6.0);
        assert_eq!(m.get_element(2, 1).unwrap(), 3.0);
    }

    #[test]
    fn failed_resize_leaves_matrix_untouched() {
        let mut m = sample();
        let before = m.clone();

        assert!(matches!(
            m.resize(usize::MAX, 3, 0),
            Err(SparseError::AllocationFailure { .. })
        ));
        assert!(m.resize(3, 3, usize::MAX).is_err());

        assert_eq!(m.row_offsets(), before.row_offsets());
        assert_eq!(m.col_indices(), before.col_indices());
        assert_eq!(m.values(), before.values());
        assert_eq!((m.nrows(), m.ncols()), (3, 3));
    }

    #[test]
    fn entry_visit_reports_explicit_zeros() {
        let mut m = CsrSparseMatrix::new(2, 2);
        m.set_element(1, 1, 0.0, true).unwrap();
        let mut seen = Vec::new();
        m.for_each_entry(&mut |r, c, v| seen.push((r, c, v)));
        assert_eq!(seen, vec![(1, 1, 0.0)]);
    }
}
