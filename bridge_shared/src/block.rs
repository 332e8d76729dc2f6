//! Block identifiers, faces, and block classification flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::math::Vec3i;

/// Back-protocol block state id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BlockStateId(pub i32);

impl BlockStateId {
    pub const AIR: Self = Self(0);
}

/// Front-protocol block runtime id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct FrontBlockId(pub u32);

/// Block face, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const VALUES: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Face from its wire index; `None` for anything outside `0..6`.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::VALUES.get(i).copied())
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    /// Unit offset pointing out of the face.
    pub fn offset(self) -> Vec3i {
        match self {
            Direction::Down => Vec3i::new(0, -1, 0),
            Direction::Up => Vec3i::new(0, 1, 0),
            Direction::North => Vec3i::new(0, 0, -1),
            Direction::South => Vec3i::new(0, 0, 1),
            Direction::West => Vec3i::new(-1, 0, 0),
            Direction::East => Vec3i::new(1, 0, 0),
        }
    }

    /// The cell adjacent to `position` across this face, if it exists.
    pub fn relative(self, position: Vec3i) -> Option<Vec3i> {
        let o = self.offset();
        position.checked_add(o.x, o.y, o.z)
    }
}

bitflags! {
    /// Classification of a back-protocol block state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
    pub struct BlockTraits: u16 {
        const WATERLOGGED = 1 << 0;
        /// Right-clicking opens or toggles something.
        const INTERACTIVE = 1 << 1;
        /// Interactive only for players allowed to build.
        const INTERACTIVE_MAY_BUILD = 1 << 2;
        const CAULDRON = 1 << 3;
        /// Cauldron holding lava or powder snow.
        const NON_WATER_CAULDRON = 1 << 4;
        const WATER = 1 << 5;
        /// Collision box taller than one block (fences, walls).
        const EXTENDED_COLLISION = 1 << 6;
        const PLAYER_SKULL = 1 << 7;
    }
}

bitflags! {
    /// Classification of a front-protocol block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
    pub struct FrontBlockTraits: u8 {
        /// Placeholder block the front client uses for item frames.
        const ITEM_FRAME = 1 << 0;
        const JIGSAW = 1 << 1;
    }
}
