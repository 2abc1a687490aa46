//! Built-in joint: activation state plus a type tag and a constraint mask.

use crate::error::{LinkError, Result};
use crate::kind::{DofMask, LinkType};
use crate::state::{LinkBase, LinkState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A link whose constraint layout is fully described by its type and mask.
///
/// Lock and mate kinds carry a [`DofMask`]; standalone kinds use the nominal
/// coordinate count of their type.
///
/// Deserialization goes through the same checks as the builders: a missing
/// mask falls back to the kind's default and a mask on a standalone kind is
/// rejected with [`LinkError::MaskNotSupported`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JointRecord")]
pub struct Joint {
    name: String,
    link_type: LinkType,
    state: LinkState,
    mask: Option<DofMask>,
}

/// Persisted form of a [`Joint`], validated on conversion.
#[derive(Deserialize)]
struct JointRecord {
    #[serde(default)]
    name: String,
    link_type: LinkType,
    #[serde(default)]
    state: LinkState,
    #[serde(default)]
    mask: Option<DofMask>,
}

impl TryFrom<JointRecord> for Joint {
    type Error = LinkError;

    fn try_from(record: JointRecord) -> Result<Self> {
        let joint = Joint::named(record.name, record.link_type).with_state(record.state);
        match record.mask {
            Some(mask) => joint.with_mask(mask),
            None => Ok(joint),
        }
    }
}

impl Joint {
    pub fn new(link_type: LinkType) -> Self {
        Self {
            name: String::new(),
            link_type,
            state: LinkState::default(),
            mask: link_type.default_mask(),
        }
    }

    pub fn named(name: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            name: name.into(),
            ..Self::new(link_type)
        }
    }

    /// Replace the constraint mask of a lock or mate joint.
    pub fn with_mask(mut self, mask: DofMask) -> Result<Self> {
        if self.link_type.default_mask().is_none() {
            return Err(LinkError::MaskNotSupported(self.link_type));
        }
        self.mask = Some(mask);
        Ok(self)
    }

    pub fn with_state(mut self, state: LinkState) -> Self {
        self.state = state;
        self
    }

    pub fn mask(&self) -> Option<DofMask> {
        self.mask
    }

    /// Turn this joint into another kind of the same family.
    ///
    /// Type and mask are replaced together; the activation state is kept.
    /// On error nothing changes.
    pub fn change_type(&mut self, new_type: LinkType) -> Result<()> {
        if !self.link_type.can_change_to(new_type) {
            return Err(LinkError::IncompatibleTypeChange {
                from: self.link_type,
                to: new_type,
            });
        }
        debug!(
            joint = %self.name,
            from = ?self.link_type,
            to = ?new_type,
            "changing joint type"
        );
        self.link_type = new_type;
        self.mask = new_type.default_mask();
        Ok(())
    }
}

impl LinkBase for Joint {
    fn state(&self) -> &LinkState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LinkState {
        &mut self.state
    }

    fn link_type(&self) -> LinkType {
        self.link_type
    }

    fn num_coords(&self) -> usize {
        match self.mask {
            Some(mask) => mask.count(),
            None => self.link_type.nominal_coords(),
        }
    }

    fn is_requiring_waking(&self) -> bool {
        self.link_type.requires_waking()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
