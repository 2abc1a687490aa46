//! Dense block sources consumed by the paste algorithms.

use nalgebra::{Dim, Matrix, RawStorage};

/// Read-only rectangular block of real values.
///
/// Physics models hand one of these to the assembly layer for every
/// constraint Jacobian or body mass contribution.
pub trait DenseBlock {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    /// Element at `(i, j)`; callers stay within `nrows() × ncols()`.
    fn get(&self, i: usize, j: usize) -> f64;
}

impl<R: Dim, C: Dim, S: RawStorage<f64, R, C>> DenseBlock for Matrix<f64, R, C, S> {
    fn nrows(&self) -> usize {
        self.shape().0
    }

    fn ncols(&self) -> usize {
        self.shape().1
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self[(i, j)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, Matrix2x3};

    #[test]
    fn dynamic_and_static_matrices_are_blocks() {
        let dynamic = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let fixed = Matrix2x3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);

        for block in [&dynamic as &dyn DenseBlock, &fixed as &dyn DenseBlock] {
            assert_eq!(block.nrows(), 2);
            assert_eq!(block.ncols(), 3);
            assert_eq!(block.get(1, 2), 6.0);
            assert_eq!(block.get(0, 1), 2.0);
        }
    }

    #[test]
    fn matrix_views_are_blocks() {
        let m = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let view = m.view((1, 1), (2, 2));
        assert_eq!(DenseBlock::nrows(&view), 2);
        assert_eq!(DenseBlock::get(&view, 1, 1), 9.0);
    }
}
