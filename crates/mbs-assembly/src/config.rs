//! Assembly configuration.

use serde::{Deserialize, Serialize};

/// Which part of the symmetric saddle-point matrix is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KktStorage {
    /// Both triangles
    #[default]
    Full,
    /// Upper triangle only (diagonal included), for symmetric factorizations
    Upper,
}

/// Assembly options, usually read from the scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Nonzero hint passed to `reset`; estimated from the blocks when unset
    pub nonzero_hint: Option<usize>,
    /// Triangle written by saddle-point assembly
    pub kkt_storage: KktStorage,
    /// Assemble independent targets on separate threads
    pub parallel: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            nonzero_hint: None,
            kkt_storage: KktStorage::Full,
            parallel: true,
        }
    }
}
