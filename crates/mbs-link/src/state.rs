//! Activation state of a link and the gate the assembly driver consults.
//!
//! ## State machine
//!
//! Three independent flags collapse into one `active` signal:
//!
//! ```text
//! active = valid && !disabled && !broken
//! ```
//!
//! - `valid` is owned by topology resolution (references to bodies resolved)
//! - `disabled` is owned by the user / configuration
//! - `broken` is owned by runtime physics (force or violation threshold)
//!
//! Nothing in this crate changes a flag implicitly. In particular a broken
//! link stays broken until its owner calls `set_broken(false)`; whether that
//! is allowed is a policy of the surrounding solver.

use crate::kind::LinkType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Activation flags of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkState {
    /// Link data is valid (references to other items are correct)
    pub valid: bool,
    /// Turned off by the user
    pub disabled: bool,
    /// Broken because of excessive pulling/pushing
    pub broken: bool,
}

impl Default for LinkState {
    fn default() -> Self {
        Self {
            valid: true,
            disabled: false,
            broken: false,
        }
    }
}

impl LinkState {
    /// Whether the link must be included in the system this timestep.
    pub fn is_active(&self) -> bool {
        self.valid && !self.disabled && !self.broken
    }
}

/// Interface every link exposes to system assembly.
pub trait LinkBase {
    fn state(&self) -> &LinkState;
    fn state_mut(&mut self) -> &mut LinkState;

    /// Type tag used for dispatch without runtime type inspection.
    fn link_type(&self) -> LinkType {
        LinkType::Base
    }

    /// Number of scalar constraint equations this link contributes.
    fn num_coords(&self) -> usize;

    /// Whether connected bodies must be woken while this link is active.
    ///
    /// Links without time-varying coupling may return false so that the
    /// solver can let their bodies sleep.
    fn is_requiring_waking(&self) -> bool {
        true
    }

    /// Human-readable identifier for diagnostics.
    fn name(&self) -> &str {
        ""
    }

    fn is_valid(&self) -> bool {
        self.state().valid
    }

    fn is_disabled(&self) -> bool {
        self.state().disabled
    }

    fn is_broken(&self) -> bool {
        self.state().broken
    }

    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    fn set_valid(&mut self, valid: bool) {
        self.state_mut().valid = valid;
    }

    fn set_disabled(&mut self, disabled: bool) {
        if disabled != self.state().disabled {
            debug!(link = self.name(), disabled, "link disabled flag changed");
        }
        self.state_mut().disabled = disabled;
    }

    fn set_broken(&mut self, broken: bool) {
        if broken && !self.state().broken {
            debug!(link = self.name(), "link broken");
        }
        self.state_mut().broken = broken;
    }
}

impl<L: LinkBase + ?Sized> LinkBase for Box<L> {
    fn state(&self) -> &LinkState {
        (**self).state()
    }
    fn state_mut(&mut self) -> &mut LinkState {
        (**self).state_mut()
    }
    fn link_type(&self) -> LinkType {
        (**self).link_type()
    }
    fn num_coords(&self) -> usize {
        (**self).num_coords()
    }
    fn is_requiring_waking(&self) -> bool {
        (**self).is_requiring_waking()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
    fn set_valid(&mut self, valid: bool) {
        (**self).set_valid(valid)
    }
    fn set_disabled(&mut self, disabled: bool) {
        (**self).set_disabled(disabled)
    }
    fn set_broken(&mut self, broken: bool) {
        (**self).set_broken(broken)
    }
}

/// Activation gate: true when `link` takes part in this timestep's assembly.
///
/// Depends on nothing but the link's current flags.
pub fn is_gate_open<L: LinkBase + ?Sized>(link: &L) -> bool {
    link.is_active()
}
