//! Collision type tags
//!
//! Every collidable carries one tag; queries pass a mask of the tags they
//! care about. A candidate matches when `mask & tag` is non-empty.

use bitflags::bitflags;

bitflags! {
    /// Collision type tag and query mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionType: u32 {
        /// Player character
        const CHARACTER = 1;
        /// Static geometry that blocks movement
        const WALL = 2;
        /// Hostile entity
        const ENEMY = 4;
        /// Collectible
        const ITEM = 8;
    }
}

impl CollisionType {
    /// No type; matches nothing
    pub const NONE: Self = Self::empty();

    /// Mask for contacts that notify but never block
    pub const SOFT: Self = Self::ENEMY.union(Self::ITEM);

    /// Whether a collidable tagged `self` is selected by `mask`
    pub fn matches(self, mask: Self) -> bool {
        self.intersects(mask)
    }
}
