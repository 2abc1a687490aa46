//! Closed set of link kinds and their constraint layouts.
//!
//! Each kind carries a stable numeric tag so that stored scenes and external
//! tools can refer to it without runtime type inspection.

use crate::error::LinkError;
use serde::{Deserialize, Serialize};

/// Family a link kind belongs to. Type changes stay inside one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkFamily {
    /// Lock-style joints described by a mask of locked relative coordinates
    Lock,
    /// Mate-style joints between two frames
    Mate,
    /// Kinds with their own formulation; never change type
    Standalone,
}

/// Constrained relative directions of a joint: translations along and
/// rotations about the link frame axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DofMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub rx: bool,
    pub ry: bool,
    pub rz: bool,
}

impl DofMask {
    pub const NONE: DofMask = DofMask::new(false, false, false, false, false, false);
    pub const ALL: DofMask = DofMask::new(true, true, true, true, true, true);

    pub const fn new(x: bool, y: bool, z: bool, rx: bool, ry: bool, rz: bool) -> Self {
        Self { x, y, z, rx, ry, rz }
    }

    /// Number of constrained directions.
    pub fn count(&self) -> usize {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
            .iter()
            .filter(|&&locked| locked)
            .count()
    }
}

macro_rules! link_types {
    ($( $(#[$doc:meta])* $variant:ident = $tag:literal, )*) => {
        /// Link type identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(u16)]
        pub enum LinkType {
            $( $(#[$doc])* $variant = $tag, )*
        }

        impl LinkType {
            /// Every link type, in tag order.
            pub const ALL: &'static [LinkType] = &[$( LinkType::$variant, )*];
        }

        impl TryFrom<u16> for LinkType {
            type Error = LinkError;

            fn try_from(tag: u16) -> Result<Self, Self::Error> {
                match tag {
                    $( $tag => Ok(LinkType::$variant), )*
                    other => Err(LinkError::UnknownTag(other)),
                }
            }
        }
    };
}

link_types! {
    /// Fully locked relative motion
    Lock = 0,
    Spherical = 1,
    PointPlane = 2,
    PointLine = 3,
    Cylindrical = 4,
    Prismatic = 5,
    PlanePlane = 6,
    Oldham = 7,
    Revolute = 8,
    RackPin = 9,
    /// No constrained direction
    Free = 10,
    Screw = 12,
    Align = 13,
    Parallel = 14,
    Perpend = 15,
    Universal = 16,
    Gear = 17,
    Coupler = 18,
    Distance = 19,
    PointSpline = 20,
    Trajectory = 22,
    RevoluteSpherical = 23,
    RevoluteTranslational = 24,
    Spring = 25,
    Wheel = 26,
    LinActuator = 27,
    /// Generic link without a specific formulation
    Base = 29,
    SpringCallback = 30,
    Engine = 31,
    Brake = 32,
    Pneumatic = 33,
    Clearance = 34,
    FastContact = 35,
    GeometricDistance = 37,
    Pulley = 38,
    Contact = 40,
    Mate = 41,
    MateGeneric = 42,
    MatePlane = 43,
    MateCoaxial = 44,
    MateSpherical = 45,
    MateParallel = 46,
    MateOrthogonal = 47,
    MateXDistance = 48,
    MateFix = 49,
    /// Revolute about z combined with translation along x
    RevolutePrismatic = 50,
}

impl LinkType {
    /// Stable numeric tag.
    pub fn tag(self) -> u16 {
        self as u16
    }

    pub fn family(self) -> LinkFamily {
        use LinkType::*;
        match self {
            Lock | Spherical | PointPlane | PointLine | Cylindrical | Prismatic | PlanePlane
            | Oldham | Revolute | Free | Align | Parallel | Perpend | RevolutePrismatic => {
                LinkFamily::Lock
            }
            Mate | MateGeneric | MatePlane | MateCoaxial | MateSpherical | MateParallel
            | MateOrthogonal | MateXDistance | MateFix => LinkFamily::Mate,
            _ => LinkFamily::Standalone,
        }
    }

    /// Default constraint mask for lock and mate kinds.
    pub fn default_mask(self) -> Option<DofMask> {
        use LinkType::*;
        let (x, y, z, rx, ry, rz) = match self {
            Lock | MateGeneric | MateFix => (true, true, true, true, true, true),
            Spherical | MateSpherical => (true, true, true, false, false, false),
            PointPlane | MateXDistance => (true, false, false, false, false, false),
            PointLine => (false, true, true, false, false, false),
            Cylindrical => (true, true, false, true, true, false),
            Prismatic => (true, true, false, true, true, true),
            PlanePlane => (false, false, true, true, true, false),
            Oldham => (false, false, true, true, true, true),
            Revolute => (true, true, true, true, true, false),
            Free | Mate => (false, false, false, false, false, false),
            Align => (false, false, false, true, true, true),
            Parallel => (false, false, false, true, true, false),
            Perpend => (false, false, false, true, false, false),
            RevolutePrismatic => (false, true, true, true, true, false),
            MatePlane => (true, false, false, false, true, true),
            MateCoaxial => (false, true, true, false, true, true),
            MateParallel => (false, false, false, false, true, true),
            MateOrthogonal => (false, false, false, true, false, false),
            _ => return None,
        };
        Some(DofMask::new(x, y, z, rx, ry, rz))
    }

    /// Number of constraint rows a link of this kind occupies with its
    /// default configuration.
    pub fn nominal_coords(self) -> usize {
        use LinkType::*;
        if let Some(mask) = self.default_mask() {
            return mask.count();
        }
        match self {
            Engine | Screw => 6,
            Brake | Pneumatic => 5,
            Universal => 4,
            Trajectory | RevoluteTranslational | Clearance => 3,
            PointSpline | RevoluteSpherical => 2,
            RackPin | Gear | Coupler | Distance | Wheel | LinActuator | FastContact
            | GeometricDistance | Pulley | Contact => 1,
            _ => 0,
        }
    }

    /// Whether bodies connected through this kind must be kept awake.
    pub fn requires_waking(self) -> bool {
        !matches!(self, LinkType::Free)
    }

    /// True when `self` may be changed into `other` in place.
    pub fn can_change_to(self, other: LinkType) -> bool {
        let family = self.family();
        family != LinkFamily::Standalone && family == other.family()
    }
}
