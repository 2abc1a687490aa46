//! The sparse matrix contract and the generic block paste algorithms.
//!
//! ## Primitives vs. derived operations
//!
//! A backend implements [`SparseMatrix`]: element insertion with overwrite or
//! accumulate semantics, element lookup, `reset` and `resize`. Everything that
//! places a dense block into the matrix lives in [`SparseMatrixExt`], which is
//! implemented once for every backend, so transpose, clip and accumulate
//! combinatorics are shared and cannot drift per backend.
//!
//! ## Fill-in policy
//!
//! - `paste_matrix` and its wrappers skip source entries that are exactly
//!   zero, so sparse backends never materialize entries with no numeric
//!   contribution. Pasting never clears a destination cell; only `reset` does.
//! - `paste_clipped_matrix` writes every cell of the selected sub-rectangle,
//!   zeros included, for deterministic placement of known-dense sub-blocks.

use crate::block::DenseBlock;
use crate::error::{Result, SparseError};
use crate::symmetry::SymmetryType;
use nalgebra_sparse::CsrMatrix;

/// Default predicted density (in [0, 1]) used to size initial storage.
pub const DEFAULT_FULLNESS: f64 = 0.1;

/// Default limit on the initial number of off-diagonal elements.
pub const DEFAULT_MAX_ELEMENTS: usize = 10_000;

/// Initial nonzero estimate for a freshly created `nrows × ncols` matrix.
pub fn estimate_nonzeros(nrows: usize, ncols: usize) -> usize {
    let predicted = (nrows as f64) * (ncols as f64) * DEFAULT_FULLNESS;
    (predicted as usize).min(DEFAULT_MAX_ELEMENTS)
}

/// Growable two-dimensional sparse numeric container.
///
/// All indices are zero-based and must lie in `[0, nrows) × [0, ncols)`.
/// Absent entries read as zero.
pub trait SparseMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;

    /// Advisory symmetry classification, never enforced on element access.
    fn symmetry(&self) -> SymmetryType;
    fn set_symmetry(&mut self, symmetry: SymmetryType);

    /// Store `value` at `(row, col)`.
    ///
    /// With `overwrite == false` the value is added to the current entry,
    /// absent entries counting as zero.
    fn set_element(&mut self, row: usize, col: usize, value: f64, overwrite: bool) -> Result<()>;

    /// Stored value at `(row, col)`, or zero when no entry exists.
    fn get_element(&self, row: usize, col: usize) -> Result<f64>;

    /// Discard all content and set the logical shape.
    ///
    /// `nonzeros` is a hint for the number of entries the caller is about to
    /// insert; zero means no hint.
    ///
    /// # Panics
    ///
    /// Backends whose storage grows with the shape may panic when the shape
    /// itself cannot be represented. `resize` reports the same condition as
    /// [`SparseError::AllocationFailure`].
    fn reset(&mut self, nrows: usize, ncols: usize, nonzeros: usize);

    /// Change the logical shape, preserving entries that remain in range.
    ///
    /// Fails with [`SparseError::AllocationFailure`] when the shape or the
    /// hint cannot be honored; the matrix is then left exactly as it was.
    fn resize(&mut self, nrows: usize, ncols: usize, nonzeros: usize) -> Result<()>;

    /// Compressed-row view of the storage, for backends that keep one.
    fn csr_export(&self) -> Option<&dyn CsrExport> {
        None
    }

    /// Visit stored entries in row-major order.
    ///
    /// The default scans every cell and reports the nonzero ones; backends
    /// with an entry structure report what they store (explicit zeros
    /// included).
    fn for_each_entry(&self, visit: &mut dyn FnMut(usize, usize, f64)) {
        for row in 0..self.nrows() {
            for col in 0..self.ncols() {
                if let Ok(value) = self.get_element(row, col)
                    && value != 0.0
                {
                    visit(row, col, value);
                }
            }
        }
    }
}

/// Read-only compressed sparse row arrays.
///
/// Exposed for handing the matrix to an external factorization routine
/// without copying.
pub trait CsrExport {
    /// Logical `(nrows, ncols)` of the exported matrix.
    fn shape(&self) -> (usize, usize);
    /// Row pointer array of length `nrows + 1`.
    fn row_offsets(&self) -> &[usize];
    /// Column index of every stored entry, sorted within each row.
    fn col_indices(&self) -> &[usize];
    /// Value of every stored entry, parallel to `col_indices`.
    fn values(&self) -> &[f64];

    /// Copy the arrays into an owned nalgebra-sparse matrix.
    fn to_csr_matrix(&self) -> Result<CsrMatrix<f64>> {
        let (nrows, ncols) = self.shape();
        CsrMatrix::try_from_csr_data(
            nrows,
            ncols,
            self.row_offsets().to_vec(),
            self.col_indices().to_vec(),
            self.values().to_vec(),
        )
        .map_err(|err| SparseError::InvalidCsr(err.to_string()))
    }
}

/// Block paste algorithms available on every [`SparseMatrix`].
///
/// Footprints are validated before the first write, so a failing paste leaves
/// the destination untouched.
pub trait SparseMatrixExt: SparseMatrix {
    /// Paste `block` with its top-left corner at `(ins_row, ins_col)`.
    ///
    /// Exactly-zero source entries are skipped. With `transpose == true` the
    /// block is placed as `blockᵀ`: entry `(i, j)` lands at
    /// `(ins_row + j, ins_col + i)`.
    fn paste_matrix(
        &mut self,
        block: &dyn DenseBlock,
        ins_row: usize,
        ins_col: usize,
        overwrite: bool,
        transpose: bool,
    ) -> Result<()> {
        let (rows, cols) = if transpose {
            (block.ncols(), block.nrows())
        } else {
            (block.nrows(), block.ncols())
        };
        check_footprint(self.nrows(), self.ncols(), ins_row, ins_col, rows, cols)?;

        for i in 0..block.nrows() {
            for j in 0..block.ncols() {
                let value = block.get(i, j);
                if value == 0.0 {
                    continue;
                }
                let (row, col) = if transpose {
                    (ins_row + j, ins_col + i)
                } else {
                    (ins_row + i, ins_col + j)
                };
                self.set_element(row, col, value, overwrite)?;
            }
        }
        Ok(())
    }

    /// Paste the `nrows × ncols` sub-rectangle of `block` starting at
    /// `(clip_row, clip_col)`, placed at `(ins_row, ins_col)`.
    ///
    /// Every selected cell is written, zeros included.
    #[allow(clippy::too_many_arguments)]
    fn paste_clipped_matrix(
        &mut self,
        block: &dyn DenseBlock,
        clip_row: usize,
        clip_col: usize,
        nrows: usize,
        ncols: usize,
        ins_row: usize,
        ins_col: usize,
        overwrite: bool,
    ) -> Result<()> {
        check_clip(block, clip_row, clip_col, nrows, ncols)?;
        check_footprint(self.nrows(), self.ncols(), ins_row, ins_col, nrows, ncols)?;

        for i in 0..nrows {
            for j in 0..ncols {
                let value = block.get(clip_row + i, clip_col + j);
                self.set_element(ins_row + i, ins_col + j, value, overwrite)?;
            }
        }
        Ok(())
    }

    /// Overwrite with `blockᵀ`.
    fn paste_transp_matrix(
        &mut self,
        block: &dyn DenseBlock,
        ins_row: usize,
        ins_col: usize,
    ) -> Result<()> {
        self.paste_matrix(block, ins_row, ins_col, true, true)
    }

    /// Accumulate `block`.
    fn paste_sum_matrix(&mut self, block: &dyn DenseBlock, ins_row: usize, ins_col: usize) -> Result<()> {
        self.paste_matrix(block, ins_row, ins_col, false, false)
    }

    /// Accumulate `blockᵀ`.
    fn paste_sum_transp_matrix(
        &mut self,
        block: &dyn DenseBlock,
        ins_row: usize,
        ins_col: usize,
    ) -> Result<()> {
        self.paste_matrix(block, ins_row, ins_col, false, true)
    }

    /// Accumulate a clipped sub-rectangle of `block`.
    #[allow(clippy::too_many_arguments)]
    fn paste_sum_clipped_matrix(
        &mut self,
        block: &dyn DenseBlock,
        clip_row: usize,
        clip_col: usize,
        nrows: usize,
        ncols: usize,
        ins_row: usize,
        ins_col: usize,
    ) -> Result<()> {
        self.paste_clipped_matrix(block, clip_row, clip_col, nrows, ncols, ins_row, ins_col, false)
    }
}

impl<M: SparseMatrix + ?Sized> SparseMatrixExt for M {}

fn check_footprint(
    nrows: usize,
    ncols: usize,
    ins_row: usize,
    ins_col: usize,
    rows: usize,
    cols: usize,
) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Ok(());
    }
    let fits = ins_row.checked_add(rows).is_some_and(|end| end <= nrows)
        && ins_col.checked_add(cols).is_some_and(|end| end <= ncols);
    if !fits {
        return Err(SparseError::PasteOutOfRange {
            ins_row,
            ins_col,
            rows,
            cols,
            nrows,
            ncols,
        });
    }
    Ok(())
}

fn check_clip(
    block: &dyn DenseBlock,
    clip_row: usize,
    clip_col: usize,
    rows: usize,
    cols: usize,
) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Ok(());
    }
    let fits = clip_row.checked_add(rows).is_some_and(|end| end <= block.nrows())
        && clip_col.checked_add(cols).is_some_and(|end| end <= block.ncols());
    if !fits {
        return Err(SparseError::ClipOutOfRange {
            clip_row,
            clip_col,
            rows,
            cols,
            block_rows: block.nrows(),
            block_cols: block.ncols(),
        });
    }
    Ok(())
}
