//! Row layout of the active constraints.

use crate::constraint::Constraint;
use mbs_link::is_gate_open;
use tracing::debug;

/// Row offset of every active constraint in the assembled system.
///
/// The gate is evaluated exactly once per constraint when the layout is
/// built; assembly then works from this snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLayout {
    offsets: Vec<Option<usize>>,
    rows: usize,
    active: usize,
}

impl RowLayout {
    pub fn build<C: Constraint>(constraints: &[C]) -> Self {
        let mut offsets = Vec::with_capacity(constraints.len());
        let mut rows = 0;
        let mut active = 0;

        for (index, constraint) in constraints.iter().enumerate() {
            if is_gate_open(constraint) {
                offsets.push(Some(rows));
                rows += constraint.num_coords();
                active += 1;
            } else {
                let state = constraint.state();
                debug!(
                    index,
                    name = constraint.name(),
                    valid = state.valid,
                    disabled = state.disabled,
                    broken = state.broken,
                    "skipping inactive constraint"
                );
                offsets.push(None);
            }
        }

        Self {
            offsets,
            rows,
            active,
        }
    }

    /// Row offset of constraint `index`, `None` when it is inactive.
    pub fn row_offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied().flatten()
    }

    /// Total constraint rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn skipped(&self) -> usize {
        self.offsets.len() - self.active
    }

    /// `(index, row_offset)` of the active constraints, in order.
    pub fn active_offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.offsets
            .iter()
            .enumerate()
            .filter_map(|(index, offset)| offset.map(|row| (index, row)))
    }
}
