//! Assembly driver: gate, validate, reset, paste.

use crate::config::{AssemblyConfig, KktStorage};
use crate::constraint::{BodyBlock, Constraint, JacobianBlock};
use crate::error::{AssemblyError, Result};
use crate::layout::RowLayout;
use mbs_sparse::{SparseMatrix, SparseMatrixExt, SymmetryType};
use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// Summary of one assembly pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    /// Constraints that passed the activation gate
    pub active: usize,
    /// Constraints left out because they are invalid, disabled or broken
    pub skipped: usize,
    /// Rows of the assembled matrix
    pub rows: usize,
    /// Columns of the assembled matrix
    pub cols: usize,
    /// Dense blocks pasted into the target
    pub blocks_pasted: usize,
    /// Bodies that must be kept awake by active constraints
    pub wake_bodies: BTreeSet<usize>,
}

/// Jacobian blocks of the active constraints, validated and ready to paste.
struct GatedJacobian {
    layout: RowLayout,
    blocks: Vec<(usize, Vec<JacobianBlock>)>,
    wake_bodies: BTreeSet<usize>,
    nonzeros: usize,
}

impl GatedJacobian {
    fn collect<C: Constraint>(constraints: &[C], num_vars: usize) -> Result<Self> {
        let layout = RowLayout::build(constraints);
        let mut blocks = Vec::with_capacity(layout.active());
        let mut wake_bodies = BTreeSet::new();
        let mut nonzeros = 0;

        for (index, row_offset) in layout.active_offsets() {
            let constraint = &constraints[index];
            let expected = constraint.num_coords();
            let jacobian = constraint.jacobian();

            for jb in &jacobian {
                if jb.block.nrows() != expected {
                    return Err(AssemblyError::BlockRowMismatch {
                        index,
                        name: constraint.name().to_string(),
                        expected,
                        found: jb.block.nrows(),
                    });
                }
                let fits = jb
                    .col_offset
                    .checked_add(jb.block.ncols())
                    .is_some_and(|end| end <= num_vars);
                if !fits {
                    return Err(AssemblyError::BlockColumnsOutOfRange {
                        index,
                        name: constraint.name().to_string(),
                        col_offset: jb.col_offset,
                        cols: jb.block.ncols(),
                        num_vars,
                    });
                }
                nonzeros += count_nonzeros(&jb.block);
            }

            if constraint.is_requiring_waking() {
                wake_bodies.extend(jacobian.iter().map(|jb| jb.body));
            }
            blocks.push((row_offset, jacobian));
        }

        Ok(Self {
            layout,
            blocks,
            wake_bodies,
            nonzeros,
        })
    }

    fn report(&self, rows: usize, cols: usize, blocks_pasted: usize) -> AssemblyReport {
        AssemblyReport {
            active: self.layout.active(),
            skipped: self.layout.skipped(),
            rows,
            cols,
            blocks_pasted,
            wake_bodies: self.wake_bodies.clone(),
        }
    }
}

/// Check body blocks and return their total nonzero count.
fn validate_bodies(bodies: &[BodyBlock], num_vars: usize) -> Result<usize> {
    let mut nonzeros = 0;
    for body in bodies {
        let (rows, cols) = body.mass.shape();
        let fits = rows == cols
            && body
                .offset
                .checked_add(rows)
                .is_some_and(|end| end <= num_vars);
        if !fits {
            return Err(AssemblyError::InvalidMassBlock {
                body: body.body,
                offset: body.offset,
                rows,
                cols,
                num_vars,
            });
        }
        nonzeros += count_nonzeros(&body.mass);
    }
    Ok(nonzeros)
}

fn count_nonzeros(block: &DMatrix<f64>) -> usize {
    block.iter().filter(|&&value| value != 0.0).count()
}

/// Assembles gated constraint and body contributions into sparse targets.
///
/// Every operation validates all contributions before touching the target,
/// then resets it to the new shape and pastes with accumulation, so several
/// blocks aimed at the same cells sum up.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    config: AssemblyConfig,
}

impl Assembler {
    pub fn new(config: AssemblyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    fn nonzero_hint(&self, estimated: usize) -> usize {
        self.config.nonzero_hint.unwrap_or(estimated)
    }

    /// Assemble the constraint Jacobian `Cq` (`rows × num_vars`).
    pub fn assemble_jacobian<M, C>(
        &self,
        target: &mut M,
        constraints: &[C],
        num_vars: usize,
    ) -> Result<AssemblyReport>
    where
        M: SparseMatrix + ?Sized,
        C: Constraint,
    {
        let gated = GatedJacobian::collect(constraints, num_vars)?;
        let rows = gated.layout.rows();

        target.reset(rows, num_vars, self.nonzero_hint(gated.nonzeros));
        target.set_symmetry(SymmetryType::General);

        let mut pasted = 0;
        for (row_offset, jacobian) in &gated.blocks {
            for jb in jacobian {
                target.paste_sum_matrix(&jb.block, *row_offset, jb.col_offset)?;
                pasted += 1;
            }
        }

        let report = gated.report(rows, num_vars, pasted);
        info!(
            rows,
            cols = num_vars,
            active = report.active,
            skipped = report.skipped,
            blocks = pasted,
            "assembled constraint Jacobian"
        );
        Ok(report)
    }

    /// Assemble the block-diagonal mass matrix (`num_vars × num_vars`).
    pub fn assemble_mass<M>(
        &self,
        target: &mut M,
        bodies: &[BodyBlock],
        num_vars: usize,
    ) -> Result<AssemblyReport>
    where
        M: SparseMatrix + ?Sized,
    {
        let nonzeros = validate_bodies(bodies, num_vars)?;

        target.reset(num_vars, num_vars, self.nonzero_hint(nonzeros));
        target.set_symmetry(SymmetryType::SymmetricPosDef);

        for body in bodies {
            target.paste_sum_matrix(&body.mass, body.offset, body.offset)?;
        }

        info!(size = num_vars, bodies = bodies.len(), "assembled mass matrix");
        Ok(AssemblyReport {
            rows: num_vars,
            cols: num_vars,
            blocks_pasted: bodies.len(),
            ..Default::default()
        })
    }

    /// Assemble the saddle-point matrix `[M Cqᵀ; Cq 0]`.
    ///
    /// With [`KktStorage::Upper`] only the upper triangle is written: mass
    /// blocks row by row from the diagonal (explicit zeros included) and
    /// `Cqᵀ`.
    pub fn assemble_kkt<M, C>(
        &self,
        target: &mut M,
        bodies: &[BodyBlock],
        constraints: &[C],
        num_vars: usize,
    ) -> Result<AssemblyReport>
    where
        M: SparseMatrix + ?Sized,
        C: Constraint,
    {
        let gated = GatedJacobian::collect(constraints, num_vars)?;
        let mass_nonzeros = validate_bodies(bodies, num_vars)?;
        let size = num_vars + gated.layout.rows();
        let storage = self.config.kkt_storage;

        let estimated = match storage {
            KktStorage::Full => mass_nonzeros + 2 * gated.nonzeros,
            KktStorage::Upper => mass_nonzeros + gated.nonzeros,
        };
        target.reset(size, size, self.nonzero_hint(estimated));
        target.set_symmetry(SymmetryType::SymmetricIndef);

        let mut pasted = 0;
        for body in bodies {
            match storage {
                KktStorage::Full => {
                    target.paste_sum_matrix(&body.mass, body.offset, body.offset)?;
                }
                KktStorage::Upper => {
                    let n = body.mass.nrows();
                    for i in 0..n {
                        let at = body.offset + i;
                        target.paste_sum_clipped_matrix(&body.mass, i, i, 1, n - i, at, at)?;
                    }
                }
            }
            pasted += 1;
        }

        for (row_offset, jacobian) in &gated.blocks {
            let row = num_vars + row_offset;
            for jb in jacobian {
                if storage == KktStorage::Full {
                    target.paste_sum_matrix(&jb.block, row, jb.col_offset)?;
                }
                target.paste_sum_transp_matrix(&jb.block, jb.col_offset, row)?;
                pasted += 1;
            }
        }

        let report = gated.report(size, size, pasted);
        info!(
            size,
            storage = ?storage,
            active = report.active,
            skipped = report.skipped,
            "assembled saddle-point matrix"
        );
        Ok(report)
    }

    /// Assemble `Cq` and `M` into two independent targets.
    ///
    /// With `parallel` enabled the two run on separate rayon tasks; each task
    /// owns its target exclusively.
    pub fn assemble_pair<J, K, C>(
        &self,
        jacobian: &mut J,
        mass: &mut K,
        bodies: &[BodyBlock],
        constraints: &[C],
        num_vars: usize,
    ) -> Result<(AssemblyReport, AssemblyReport)>
    where
        J: SparseMatrix + Send + ?Sized,
        K: SparseMatrix + Send + ?Sized,
        C: Constraint + Sync,
    {
        if !self.config.parallel {
            let jac = self.assemble_jacobian(jacobian, constraints, num_vars)?;
            let mass = self.assemble_mass(mass, bodies, num_vars)?;
            return Ok((jac, mass));
        }

        let (jac, mass) = rayon::join(
            || self.assemble_jacobian(jacobian, constraints, num_vars),
            || self.assemble_mass(mass, bodies, num_vars),
        );
        Ok((jac?, mass?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::StaticConstraint;
    use mbs_link::{Joint, LinkBase, LinkType};
    use mbs_sparse::{DenseMatrix, TripletMatrix};

    fn distance(name: &str, blocks: Vec<JacobianBlock>) -> StaticConstraint {
        StaticConstraint::new(Joint::named(name, LinkType::Distance), blocks)
    }

    #[test]
    fn shared_body_columns_accumulate() {
        // Two blocks of one constraint hitting the same columns sum up.
        let c = distance(
            "d",
            vec![
                JacobianBlock::new(0, 0, DMatrix::from_row_slice(1, 2, &[1.0, 2.0])),
                JacobianBlock::new(0, 0, DMatrix::from_row_slice(1, 2, &[0.5, 0.0])),
            ],
        );
        let mut target = TripletMatrix::new(0, 0);
        let report = Assembler::default()
            .assemble_jacobian(&mut target, &[c], 2)
            .unwrap();

        assert_eq!(report.rows, 1);
        assert_eq!(report.blocks_pasted, 2);
        assert_eq!(target.get_element(0, 0).unwrap(), 1.5);
        assert_eq!(target.get_element(0, 1).unwrap(), 2.0);
    }

    #[test]
    fn row_mismatch_leaves_target_untouched() {
        let c = distance(
            "bad",
            vec![JacobianBlock::new(0, 0, DMatrix::from_element(2, 1, 1.0))],
        );
        let mut target = DenseMatrix::new(1, 1);
        target.set_element(0, 0, 3.0, true).unwrap();

        let err = Assembler::default()
            .assemble_jacobian(&mut target, &[c], 1)
            .unwrap_err();
        assert_eq!(
            err,
            AssemblyError::BlockRowMismatch {
                index: 0,
                name: "bad".to_string(),
                expected: 1,
                found: 2
            }
        );
        assert_eq!(target.get_element(0, 0).unwrap(), 3.0);
    }

    #[test]
    fn block_past_last_variable_is_rejected() {
        let c = distance(
            "wide",
            vec![JacobianBlock::new(0, 2, DMatrix::from_element(1, 3, 1.0))],
        );
        let err = Assembler::default()
            .assemble_jacobian(&mut TripletMatrix::new(0, 0), &[c], 4)
            .unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::BlockColumnsOutOfRange { col_offset: 2, cols: 3, num_vars: 4, .. }
        ));
    }

    #[test]
    fn inactive_constraints_are_not_queried() {
        // A broken constraint with an invalid block must not fail assembly.
        let mut broken = distance(
            "broken",
            vec![JacobianBlock::new(0, 0, DMatrix::from_element(7, 7, 1.0))],
        );
        broken.set_broken(true);
        let ok = distance(
            "ok",
            vec![JacobianBlock::new(1, 1, DMatrix::from_element(1, 1, 2.0))],
        );

        let mut target = TripletMatrix::new(0, 0);
        let report = Assembler::default()
            .assemble_jacobian(&mut target, &[broken, ok], 2)
            .unwrap();
        assert_eq!(report.active, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.wake_bodies, BTreeSet::from([1]));
        assert_eq!(target.nnz(), 1);
        assert_eq!(target.get_element(0, 1).unwrap(), 2.0);
    }

    #[test]
    fn non_square_mass_is_rejected() {
        let bodies = [BodyBlock::new(3, 0, DMatrix::from_element(2, 3, 1.0))];
        let err = Assembler::default()
            .assemble_mass(&mut TripletMatrix::new(0, 0), &bodies, 6)
            .unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidMassBlock { body: 3, .. }));
    }

    #[test]
    fn hint_override_wins() {
        let assembler = Assembler::new(AssemblyConfig {
            nonzero_hint: Some(42),
            ..Default::default()
        });
        assert_eq!(assembler.nonzero_hint(7), 42);
        assert_eq!(Assembler::default().nonzero_hint(7), 7);
    }
}
