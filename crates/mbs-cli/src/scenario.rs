//! JSON scenario: variables, body mass blocks and recorded constraints.
//!
//! ```json
//! {
//!   "num_vars": 6,
//!   "config": { "kkt_storage": "upper" },
//!   "bodies": [{ "body": 0, "offset": 0, "mass": [[2, 0, 0], [0, 2, 0], [0, 0, 1]] }],
//!   "constraints": [{
//!     "name": "rod",
//!     "link_type": "distance",
//!     "state": { "broken": false },
//!     "blocks": [{ "body": 0, "col_offset": 0, "rows": [[1, 2, 0]] }]
//!   }]
//! }
//! ```

use std::path::Path;

use mbs_assembly::{AssemblyConfig, BodyBlock, JacobianBlock, StaticConstraint};
use mbs_link::{DofMask, Joint, LinkState, LinkType};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScenarioError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub body: usize,
    pub offset: usize,
    pub mass: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub body: usize,
    pub col_offset: usize,
    pub rows: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    #[serde(default)]
    pub name: String,
    pub link_type: LinkType,
    #[serde(default)]
    pub state: LinkState,
    /// Replaces the default mask of lock and mate kinds
    #[serde(default)]
    pub mask: Option<DofMask>,
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub num_vars: usize,
    #[serde(default)]
    pub config: AssemblyConfig,
    #[serde(default)]
    pub bodies: Vec<BodyRecord>,
    #[serde(default)]
    pub constraints: Vec<ConstraintRecord>,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scenario = Self::from_json(&text)?;
        debug!(
            path = %path.as_ref().display(),
            num_vars = scenario.num_vars,
            bodies = scenario.bodies.len(),
            constraints = scenario.constraints.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    pub fn body_blocks(&self) -> Result<Vec<BodyBlock>> {
        self.bodies
            .iter()
            .map(|record| {
                let mass = rows_to_matrix(&record.mass, || format!("body {} mass", record.body))?;
                Ok(BodyBlock::new(record.body, record.offset, mass))
            })
            .collect()
    }

    pub fn static_constraints(&self) -> Result<Vec<StaticConstraint>> {
        self.constraints
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut joint =
                    Joint::named(record.name.clone(), record.link_type).with_state(record.state);
                if let Some(mask) = record.mask {
                    joint = joint.with_mask(mask).map_err(|source| ScenarioError::Link {
                        index,
                        name: record.name.clone(),
                        source,
                    })?;
                }

                let blocks = record
                    .blocks
                    .iter()
                    .map(|block| {
                        let matrix = rows_to_matrix(&block.rows, || {
                            format!("constraint {index} ({}) block", record.name)
                        })?;
                        Ok(JacobianBlock::new(block.body, block.col_offset, matrix))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(StaticConstraint::new(joint, blocks))
            })
            .collect()
    }
}

/// Row-major nested vectors to a dense block; every row must have the same length.
fn rows_to_matrix(rows: &[Vec<f64>], what: impl Fn() -> String) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some((row, found)) = rows
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, len)| len != ncols)
    {
        return Err(ScenarioError::RaggedBlock {
            what: what(),
            row,
            expected: ncols,
            found,
        });
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}
