//! System matrix assembly for multibody timesteps.
//!
//! Builds the global matrices a solver needs from per-constraint and per-body
//! dense contributions:
//! - `Cq`: constraint Jacobian (rows = active constraint coordinates)
//! - `M`: mass matrix (rows = cols = system variables)
//! - saddle point (KKT) matrix combining both
//!
//! ## Assembly Process
//!
//! 1. Gate every constraint once (`valid && !disabled && !broken`)
//! 2. Assign consecutive row offsets to the active ones
//! 3. Collect and validate their Jacobian blocks
//! 4. Reset the target with a nonzero hint
//! 5. Paste blocks at `(row_offset, col_offset)`, accumulating
//!
//! ```text
//!            num_vars        rows
//!         ┌────────────┬───────────┐
//!         │     M      │    Cqᵀ    │  num_vars
//! KKT  =  ├────────────┼───────────┤
//!         │     Cq     │     0     │  rows
//!         └────────────┴───────────┘
//! ```

pub mod assembler;
pub mod config;
pub mod constraint;
pub mod error;
pub mod layout;

pub use assembler::{Assembler, AssemblyReport};
pub use config::{AssemblyConfig, KktStorage};
pub use constraint::{BodyBlock, Constraint, JacobianBlock, StaticConstraint};
pub use error::{AssemblyError, Result};
pub use layout::RowLayout;
