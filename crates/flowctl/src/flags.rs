//! Behavioral flags of a flow.
//!
//! The low two bits hold the access mode; the remaining bits are independent
//! switches. Bits this crate does not name are carried through unchanged.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use flowctl_primitive::EPERM;

/// Value `FlowControl::flags_or_sentinel` returns when the flags cannot be read.
///
/// Always negative, so it never collides with a valid flag set.
pub const FLAGS_SENTINEL: i32 = -EPERM;

/// Bitmask of flow flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FlowFlags(u32);

impl FlowFlags {
    pub const READ_ONLY: Self = Self(0o0);
    pub const WRITE_ONLY: Self = Self(0o1);
    pub const READ_WRITE: Self = Self(0o2);
    pub const DOWN: Self = Self(0o4);
    pub const NON_BLOCKING_READ: Self = Self(0o1000);
    pub const NON_BLOCKING_WRITE: Self = Self(0o2000);
    pub const NON_BLOCKING: Self = Self(0o1000 | 0o2000);
    pub const NO_PARTIAL_READ: Self = Self(0o10000);
    pub const NO_PARTIAL_WRITE: Self = Self(0o200000);

    /// Bits selecting the access mode.
    pub const ACCESS_MODE_MASK: u32 = 0o3;

    /// Every named bit.
    pub const ALL: Self = Self(
        Self::ACCESS_MODE_MASK
            | Self::DOWN.0
            | Self::NON_BLOCKING.0
            | Self::NO_PARTIAL_READ.0
            | Self::NO_PARTIAL_WRITE.0,
    );

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap raw bits, keeping bits without a name.
    pub const fn from_bits_retain(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Bits outside [`FlowFlags::ALL`].
    pub const fn unknown_bits(self) -> u32 {
        self.0 & !Self::ALL.0
    }

    pub fn access_mode(self) -> AccessMode {
        match self.0 & Self::ACCESS_MODE_MASK {
            0o1 => AccessMode::WriteOnly,
            0o2 | 0o3 => AccessMode::ReadWrite,
            _ => AccessMode::ReadOnly,
        }
    }

    /// Replace the access mode bits.
    pub fn with_access_mode(self, mode: AccessMode) -> Self {
        Self((self.0 & !Self::ACCESS_MODE_MASK) | mode.bits())
    }
}

// The flags value shares an `int` return channel with `FLAGS_SENTINEL`.
// Every named flag must stay in the non-negative `i32` range.
const _: () = assert!(
    FlowFlags::ALL.bits() <= i32::MAX as u32,
    "flow flags must not reach the sign bit of the get-flags return value"
);
const _: () = assert!(FLAGS_SENTINEL < 0);

impl BitOr for FlowFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for FlowFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FlowFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for FlowFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<FlowFlags> for u32 {
    fn from(flags: FlowFlags) -> Self {
        flags.0
    }
}

impl fmt::Debug for FlowFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMED: [(FlowFlags, &str); 5] = [
            (FlowFlags::DOWN, "DOWN"),
            (FlowFlags::NON_BLOCKING_READ, "NON_BLOCKING_READ"),
            (FlowFlags::NON_BLOCKING_WRITE, "NON_BLOCKING_WRITE"),
            (FlowFlags::NO_PARTIAL_READ, "NO_PARTIAL_READ"),
            (FlowFlags::NO_PARTIAL_WRITE, "NO_PARTIAL_WRITE"),
        ];

        let mode = self.access_mode();
        write!(f, "FlowFlags({mode:?}")?;
        for (flag, name) in NAMED {
            if self.contains(flag) {
                write!(f, " | {name}")?;
            }
        }
        // Mode bit 0o3 reads as ReadWrite; show the stray low bit with the rest.
        let stray = self.unknown_bits() | (self.0 & Self::ACCESS_MODE_MASK & !mode.bits());
        if stray != 0 {
            write!(f, " | {stray:#o}")?;
        }
        f.write_str(")")
    }
}

/// Access mode encoded in the low bits of [`FlowFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub const fn bits(self) -> u32 {
        match self {
            AccessMode::ReadOnly => 0o0,
            AccessMode::WriteOnly => 0o1,
            AccessMode::ReadWrite => 0o2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blocking_is_both_directions() {
        let flags = FlowFlags::READ_WRITE | FlowFlags::NON_BLOCKING;
        assert!(flags.contains(FlowFlags::NON_BLOCKING_READ));
        assert!(flags.contains(FlowFlags::NON_BLOCKING_WRITE));
        assert!(!flags.contains(FlowFlags::DOWN));
        assert_eq!(flags.access_mode(), AccessMode::ReadWrite);
    }

    #[test]
    fn access_mode_replacement_keeps_other_bits() {
        let flags =
            (FlowFlags::READ_WRITE | FlowFlags::DOWN).with_access_mode(AccessMode::WriteOnly);
        assert_eq!(flags.access_mode(), AccessMode::WriteOnly);
        assert!(flags.contains(FlowFlags::DOWN));
        assert_eq!(flags.bits(), 0o5);
    }

    #[test]
    fn unknown_bits_are_retained() {
        let flags = FlowFlags::from_bits_retain(0o2 | 0o40);
        assert_eq!(flags.bits(), 0o42);
        assert_eq!(flags.unknown_bits(), 0o40);
        assert_eq!(format!("{flags:?}"), "FlowFlags(ReadWrite | 0o40)");
    }

    #[test]
    fn sentinel_is_outside_flag_domain() {
        assert!(FLAGS_SENTINEL < 0);
        assert!(i32::try_from(FlowFlags::ALL.bits()).is_ok());
    }

    #[test]
    fn debug_shows_both_access_mode_bits() {
        let both = FlowFlags::from_bits_retain(0o3);
        assert_eq!(both.access_mode(), AccessMode::ReadWrite);
        assert_eq!(format!("{both:?}"), "FlowFlags(ReadWrite | 0o1)");
        assert_ne!(format!("{both:?}"), format!("{:?}", FlowFlags::READ_WRITE));
        assert_eq!(format!("{:?}", FlowFlags::READ_WRITE), "FlowFlags(ReadWrite)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_raw_bits() {
        let flags = FlowFlags::READ_WRITE | FlowFlags::NON_BLOCKING;
        assert_eq!(serde_json::to_string(&flags).unwrap(), "1538");
        let back: FlowFlags = serde_json::from_str("1538").unwrap();
        assert_eq!(back, flags);
        let unnamed: FlowFlags = serde_json::from_str("34").unwrap();
        assert_eq!(unnamed.unknown_bits(), 0o40);
    }

    #[test]
    fn debug_lists_named_flags() {
        let flags = FlowFlags::READ_ONLY | FlowFlags::NO_PARTIAL_WRITE;
        assert_eq!(format!("{flags:?}"), "FlowFlags(ReadOnly | NO_PARTIAL_WRITE)");
    }
}
