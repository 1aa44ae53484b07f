use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask of ICAO portrait-compliance warnings reported on an attribute
/// record by the analysis engine. Flags are independent; any subset may be
/// set at once.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IcaoWarnings(u32);

impl IcaoWarnings {
    pub const NONE: Self = Self(0);

    pub const FACE_NOT_DETECTED: Self = Self(1);
    pub const EXPRESSION: Self = Self(1 << 1);
    pub const DARK_GLASSES: Self = Self(1 << 2);
    pub const BLINK: Self = Self(1 << 3);
    pub const MOUTH_OPEN: Self = Self(1 << 4);
    pub const ROLL_LEFT: Self = Self(1 << 5);
    pub const ROLL_RIGHT: Self = Self(1 << 6);
    pub const YAW_LEFT: Self = Self(1 << 7);
    pub const YAW_RIGHT: Self = Self(1 << 8);
    pub const PITCH_UP: Self = Self(1 << 9);
    pub const PITCH_DOWN: Self = Self(1 << 10);
    pub const TOO_NEAR: Self = Self(1 << 11);
    pub const TOO_FAR: Self = Self(1 << 12);
    pub const TOO_NORTH: Self = Self(1 << 13);
    pub const TOO_SOUTH: Self = Self(1 << 14);
    pub const TOO_EAST: Self = Self(1 << 15);
    pub const TOO_WEST: Self = Self(1 << 16);
    pub const SHARPNESS: Self = Self(1 << 17);
    pub const GRAYSCALE_DENSITY: Self = Self(1 << 18);
    pub const SATURATION: Self = Self(1 << 19);
    pub const BACKGROUND_UNIFORMITY: Self = Self(1 << 20);

    /// Flag names as they appear in scenario files, paired with their bits.
    pub const NAMED: &[(&'static str, IcaoWarnings)] = &[
        ("face-not-detected", Self::FACE_NOT_DETECTED),
        ("expression", Self::EXPRESSION),
        ("dark-glasses", Self::DARK_GLASSES),
        ("blink", Self::BLINK),
        ("mouth-open", Self::MOUTH_OPEN),
        ("roll-left", Self::ROLL_LEFT),
        ("roll-right", Self::ROLL_RIGHT),
        ("yaw-left", Self::YAW_LEFT),
        ("yaw-right", Self::YAW_RIGHT),
        ("pitch-up", Self::PITCH_UP),
        ("pitch-down", Self::PITCH_DOWN),
        ("too-near", Self::TOO_NEAR),
        ("too-far", Self::TOO_FAR),
        ("too-north", Self::TOO_NORTH),
        ("too-south", Self::TOO_SOUTH),
        ("too-east", Self::TOO_EAST),
        ("too-west", Self::TOO_WEST),
        ("sharpness", Self::SHARPNESS),
        ("grayscale-density", Self::GRAYSCALE_DENSITY),
        ("saturation", Self::SATURATION),
        ("background-uniformity", Self::BACKGROUND_UNIFORMITY),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// `true` when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` when `self` and `other` share at least one bit.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Looks up a single flag by its scenario-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, flag)| *flag)
    }
}

impl BitOr for IcaoWarnings {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for IcaoWarnings {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for IcaoWarnings {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for IcaoWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "IcaoWarnings(none)");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        write!(f, "IcaoWarnings({})", names.join("|"))
    }
}
