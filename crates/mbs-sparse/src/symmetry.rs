//! Symmetry classification attached to a sparse matrix.
//!
//! The hint is advisory: backends never enforce it on `set_element` or
//! `get_element`. A caller that wants a symmetric representation writes only
//! the intended half and tags the matrix so downstream solvers can pick a
//! suitable factorization.

use serde::{Deserialize, Serialize};

/// Symmetry type of a sparse matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryType {
    /// Unsymmetric matrix
    #[default]
    General,
    /// Symmetric positive definite
    SymmetricPosDef,
    /// Symmetric indefinite
    SymmetricIndef,
    /// Structurally symmetric (pattern symmetric, values may differ)
    StructurallySymmetric,
}

impl SymmetryType {
    /// True when values are symmetric, i.e. `A = Aᵀ`.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::SymmetricPosDef | Self::SymmetricIndef)
    }

    /// True when the sparsity pattern is symmetric.
    pub fn is_structurally_symmetric(&self) -> bool {
        !matches!(self, Self::General)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::SymmetricPosDef => "symmetric_pos_def",
            Self::SymmetricIndef => "symmetric_indef",
            Self::StructurallySymmetric => "structurally_symmetric",
        }
    }
}
