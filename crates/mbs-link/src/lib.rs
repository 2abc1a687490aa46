//! Links (constraints) as seen by system assembly.
//!
//! The assembly layer never inspects joint physics. It needs three things
//! from every link:
//! - whether it participates in this timestep (the activation gate)
//! - how many constraint rows it occupies (`num_coords`)
//! - a closed type tag for fast dispatch (`LinkType`)
//!
//! Physics crates implement [`LinkBase`] for their own link structs; [`Joint`]
//! is the built-in implementation for the lock and mate families.

pub mod error;
pub mod joint;
pub mod kind;
pub mod state;

pub use error::{LinkError, Result};
pub use joint::Joint;
pub use kind::{DofMask, LinkFamily, LinkType};
pub use state::{is_gate_open, LinkBase, LinkState};
