//! Scenario loading and matrix reports for the `mbs-cli` binary.

pub mod error;
pub mod report;
pub mod scenario;

pub use error::{Result, ScenarioError};
pub use report::{Backend, GateRow, MatrixData, MatrixReport, Target};
pub use scenario::{BlockRecord, BodyRecord, ConstraintRecord, Scenario};
