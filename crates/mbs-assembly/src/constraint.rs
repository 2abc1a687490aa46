//! Dense contributions supplied by physics models.

use mbs_link::{Joint, LinkBase, LinkState, LinkType};
use nalgebra::DMatrix;

/// Jacobian of one constraint with respect to one body's variables.
///
/// `block` has one row per constraint coordinate and one column per body
/// variable; it lands at columns `col_offset..col_offset + block.ncols()`.
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianBlock {
    pub body: usize,
    pub col_offset: usize,
    pub block: DMatrix<f64>,
}

impl JacobianBlock {
    pub fn new(body: usize, col_offset: usize, block: DMatrix<f64>) -> Self {
        Self {
            body,
            col_offset,
            block,
        }
    }
}

/// Mass (or any square per-body) block placed on the diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyBlock {
    pub body: usize,
    pub offset: usize,
    pub mass: DMatrix<f64>,
}

impl BodyBlock {
    pub fn new(body: usize, offset: usize, mass: DMatrix<f64>) -> Self {
        Self { body, offset, mass }
    }
}

/// A link that can report its Jacobian blocks.
///
/// Only called for links whose activation gate is open.
pub trait Constraint: LinkBase {
    fn jacobian(&self) -> Vec<JacobianBlock>;
}

impl<C: Constraint + ?Sized> Constraint for Box<C> {
    fn jacobian(&self) -> Vec<JacobianBlock> {
        (**self).jacobian()
    }
}

/// Joint with Jacobian blocks computed ahead of time.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticConstraint {
    pub joint: Joint,
    pub blocks: Vec<JacobianBlock>,
}

impl StaticConstraint {
    pub fn new(joint: Joint, blocks: Vec<JacobianBlock>) -> Self {
        Self { joint, blocks }
    }
}

impl LinkBase for StaticConstraint {
    fn state(&self) -> &LinkState {
        self.joint.state()
    }

    fn state_mut(&mut self) -> &mut LinkState {
        self.joint.state_mut()
    }

    fn link_type(&self) -> LinkType {
        self.joint.link_type()
    }

    fn num_coords(&self) -> usize {
        self.joint.num_coords()
    }

    fn is_requiring_waking(&self) -> bool {
        self.joint.is_requiring_waking()
    }

    fn name(&self) -> &str {
        self.joint.name()
    }
}

impl Constraint for StaticConstraint {
    fn jacobian(&self) -> Vec<JacobianBlock> {
        self.blocks.clone()
    }
}
