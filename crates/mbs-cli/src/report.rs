//! Assembled-matrix and gate-table reports printed by the CLI.

use std::str::FromStr;

use mbs_assembly::{Assembler, AssemblyReport};
use mbs_link::{LinkBase, LinkType, is_gate_open};
use mbs_sparse::{CsrSparseMatrix, DenseMatrix, SparseMatrix, SymmetryType, TripletMatrix};
use serde::Serialize;

use crate::error::{Result, ScenarioError};
use crate::scenario::Scenario;

/// Storage backend selected with `--backend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Csr,
    Triplet,
    Dense,
}

impl Backend {
    pub fn new_matrix(self) -> Box<dyn SparseMatrix> {
        match self {
            Backend::Csr => Box::new(CsrSparseMatrix::new(0, 0)),
            Backend::Triplet => Box::new(TripletMatrix::new(0, 0)),
            Backend::Dense => Box::new(DenseMatrix::new(0, 0)),
        }
    }
}

impl FromStr for Backend {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csr" => Ok(Backend::Csr),
            "triplet" => Ok(Backend::Triplet),
            "dense" => Ok(Backend::Dense),
            _ => Err(ScenarioError::UnknownBackend(s.to_string())),
        }
    }
}

/// Which system matrix to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Jacobian,
    Kkt,
}

/// Matrix contents: raw CSR arrays when the backend exposes them,
/// element-wise triplets otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum MatrixData {
    Csr {
        row_offsets: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
    },
    Triplets {
        entries: Vec<(usize, usize, f64)>,
    },
}

impl MatrixData {
    pub fn capture(matrix: &dyn SparseMatrix) -> Self {
        if let Some(csr) = matrix.csr_export() {
            return MatrixData::Csr {
                row_offsets: csr.row_offsets().to_vec(),
                col_indices: csr.col_indices().to_vec(),
                values: csr.values().to_vec(),
            };
        }
        let mut entries = Vec::new();
        matrix.for_each_entry(&mut |row, col, value| entries.push((row, col, value)));
        MatrixData::Triplets { entries }
    }

    pub fn nnz(&self) -> usize {
        match self {
            MatrixData::Csr { values, .. } => values.len(),
            MatrixData::Triplets { entries } => entries.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixReport {
    pub generated_at: String,
    pub target: Target,
    pub backend: Backend,
    pub nrows: usize,
    pub ncols: usize,
    pub symmetry: SymmetryType,
    pub nnz: usize,
    pub assembly: AssemblyReport,
    pub matrix: MatrixData,
}

impl MatrixReport {
    /// Assemble `target` from `scenario` into a fresh `backend` matrix.
    pub fn assemble(scenario: &Scenario, backend: Backend, target: Target) -> Result<Self> {
        let constraints = scenario.static_constraints()?;
        let assembler = Assembler::new(scenario.config.clone());
        let mut matrix = backend.new_matrix();

        let assembly = match target {
            Target::Jacobian => {
                assembler.assemble_jacobian(&mut *matrix, &constraints, scenario.num_vars)?
            }
            Target::Kkt => {
                let bodies = scenario.body_blocks()?;
                assembler.assemble_kkt(&mut *matrix, &bodies, &constraints, scenario.num_vars)?
            }
        };

        let data = MatrixData::capture(&*matrix);
        Ok(Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            target,
            backend,
            nrows: matrix.nrows(),
            ncols: matrix.ncols(),
            symmetry: matrix.symmetry(),
            nnz: data.nnz(),
            assembly,
            matrix: data,
        })
    }
}

/// One line of the `inspect` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateRow {
    pub index: usize,
    pub name: String,
    pub link_type: LinkType,
    pub tag: u16,
    pub valid: bool,
    pub disabled: bool,
    pub broken: bool,
    pub active: bool,
    pub coords: usize,
    pub wakes: bool,
}

impl GateRow {
    pub fn table(scenario: &Scenario) -> Result<Vec<GateRow>> {
        let constraints = scenario.static_constraints()?;
        Ok(constraints
            .iter()
            .enumerate()
            .map(|(index, constraint)| GateRow {
                index,
                name: constraint.name().to_string(),
                link_type: constraint.link_type(),
                tag: constraint.link_type().tag(),
                valid: constraint.is_valid(),
                disabled: constraint.is_disabled(),
                broken: constraint.is_broken(),
                active: is_gate_open(constraint),
                coords: constraint.num_coords(),
                wakes: constraint.is_requiring_waking(),
            })
            .collect())
    }
}
