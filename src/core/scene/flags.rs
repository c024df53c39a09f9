//=========================================================================
// Scene Flags
//=========================================================================
//
// Per-frame request bits. Set by anyone during a frame, consumed by the
// render pass, cleared by the diagnostics handler at the end of the frame.
//
//=========================================================================

//=== SceneFlags ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SceneFlags {
    bits: u32,
}

impl SceneFlags {
    pub const EMPTY: Self = Self { bits: 0 };

    /// Re-sort sprites by (z, id) before the next draw.
    pub const NEEDS_SORTING: Self = Self { bits: 1 << 0 };

    pub const fn bits(&self) -> u32 {
        self.bits
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// True if every flag in `other` is set.
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    pub fn insert(&mut self, other: Self) {
        self.bits |= other.bits;
    }

    pub fn remove(&mut self, other: Self) {
        self.bits &= !other.bits;
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }
}

impl std::ops::BitOr for SceneFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
