//! Error types for mbs-sparse

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SparseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseError {
    #[error("index ({row}, {col}) out of range for {nrows}x{ncols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error(
        "{rows}x{cols} block pasted at ({ins_row}, {ins_col}) exceeds {nrows}x{ncols} matrix"
    )]
    PasteOutOfRange {
        ins_row: usize,
        ins_col: usize,
        rows: usize,
        cols: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error(
        "clip {rows}x{cols} at ({clip_row}, {clip_col}) exceeds {block_rows}x{block_cols} source block"
    )]
    ClipOutOfRange {
        clip_row: usize,
        clip_col: usize,
        rows: usize,
        cols: usize,
        block_rows: usize,
        block_cols: usize,
    },

    #[error("cannot allocate {nrows}x{ncols} matrix with {nonzeros} nonzeros")]
    AllocationFailure {
        nrows: usize,
        ncols: usize,
        nonzeros: usize,
    },

    #[error("invalid CSR data: {0}")]
    InvalidCsr(String),
}

/// Bounds check shared by all backends.
pub fn check_index(row: usize, col: usize, nrows: usize, ncols: usize) -> Result<()> {
    if row >= nrows || col >= ncols {
        return Err(SparseError::IndexOutOfRange {
            row,
            col,
            nrows,
            ncols,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_index_rejects_row_and_column_overflow() {
        assert!(check_index(0, 0, 1, 1).is_ok());
        assert_eq!(
            check_index(1, 0, 1, 1),
            Err(SparseError::IndexOutOfRange {
                row: 1,
                col: 0,
                nrows: 1,
                ncols: 1
            })
        );
        assert!(check_index(0, 3, 2, 3).is_err());
        assert!(check_index(0, 0, 0, 0).is_err());
    }

    #[test]
    fn messages_name_the_shape() {
        let err = SparseError::IndexOutOfRange {
            row: 4,
            col: 2,
            nrows: 3,
            ncols: 3,
        };
        assert_eq!(err.to_string(), "index (4, 2) out of range for 3x3 matrix");
    }
}
