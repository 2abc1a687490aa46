//! Error types for mbs-link

use crate::kind::LinkType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("unknown link type tag: {0}")]
    UnknownTag(u16),

    #[error("cannot change link type from {from:?} to {to:?}: different families")]
    IncompatibleTypeChange { from: LinkType, to: LinkType },

    #[error("link type {0:?} has no configurable constraint mask")]
    MaskNotSupported(LinkType),
}
