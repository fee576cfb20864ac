//! Activation masks
//!
//! A `LevelMask` is one bit per level id. It is derived from a writer's
//! matching configuration entry and cached per (writer, generation) pair;
//! the write-path check is a single bit test.

use std::fmt;

use crate::level::LevelId;

/// Bit mask of enabled level ids
///
/// Bit `n` set means the level with id `n` is enabled. The mask is a 32-bit
/// word, which caps the registry at 32 levels (predefined + aspects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelMask(u32);

impl LevelMask {
    /// Mask with every bit set
    pub const ALL: Self = Self(u32::MAX);

    /// Mask with no bit set
    pub const NONE: Self = Self(0);

    /// Create a mask from raw bits
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Mask enabling ids `0..=id` (the given severity and everything more severe)
    #[inline]
    #[must_use]
    pub const fn up_to(id: LevelId) -> Self {
        let bit = id.as_u8() as u32;
        if bit >= 31 {
            Self::ALL
        } else {
            Self((1u32 << (bit + 1)) - 1)
        }
    }

    /// Test whether a level id is enabled - the write-path gate
    #[inline]
    pub const fn is_active(self, id: LevelId) -> bool {
        self.0 & (1u32 << id.as_u8() as u32) != 0
    }

    /// Enable a level id
    #[inline]
    pub fn set(&mut self, id: LevelId) {
        self.0 |= 1u32 << id.as_u8() as u32;
    }

    /// Disable a level id
    #[inline]
    pub fn clear(&mut self, id: LevelId) {
        self.0 &= !(1u32 << id.as_u8() as u32);
    }

    /// Get the raw bits
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether no level is enabled
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for LevelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_to() {
        assert_eq!(LevelMask::up_to(LevelId::new(0)).bits(), 0x0000_0001);
        assert_eq!(LevelMask::up_to(LevelId::new(5)).bits(), 0x0000_003F);
        assert_eq!(LevelMask::up_to(LevelId::new(8)).bits(), 0x0000_01FF);
        assert_eq!(LevelMask::up_to(LevelId::new(31)).bits(), u32::MAX);
    }

    #[test]
    fn test_set_clear_is_active() {
        let mut mask = LevelMask::NONE;
        assert!(!mask.is_active(LevelId::new(13)));

        mask.set(LevelId::new(13));
        assert!(mask.is_active(LevelId::new(13)));
        assert_eq!(mask.bits(), 0x0000_2000);

        mask.clear(LevelId::new(13));
        assert!(mask.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(LevelMask::from_bits(0x21F7).to_string(), "0x000021f7");
    }
}
