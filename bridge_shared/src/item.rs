//! Item identifiers and stacks for both protocols.

use serde::{Deserialize, Serialize};

/// Back-protocol item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BackItemId(pub i32);

/// Back-protocol item stack. A zero count is an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemStack {
    pub item: BackItemId,
    pub count: u32,
}

impl ItemStack {
    pub const EMPTY: Self = Self {
        item: BackItemId(0),
        count: 0,
    };

    pub const fn new(item: BackItemId, count: u32) -> Self {
        Self { item, count }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Removes `n` items; the stack collapses to [`ItemStack::EMPTY`] at zero.
    pub fn sub(&mut self, n: u32) {
        self.count = self.count.saturating_sub(n);
        if self.count == 0 {
            *self = Self::EMPTY;
        }
    }

    /// Wire form of a slot: `None` when empty.
    pub fn to_option(self) -> Option<ItemStack> {
        (!self.is_empty()).then_some(self)
    }
}

/// Front-protocol item definition (runtime id). `0` is air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct FrontItemDef(pub i32);

impl FrontItemDef {
    pub const AIR: Self = Self(0);
}

/// Front-protocol item snapshot as declared by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FrontItemData {
    pub definition: FrontItemDef,
    #[serde(default)]
    pub count: u32,
}

impl FrontItemData {
    pub const AIR: Self = Self {
        definition: FrontItemDef::AIR,
        count: 0,
    };

    pub const fn new(definition: FrontItemDef, count: u32) -> Self {
        Self { definition, count }
    }

    pub fn is_null(&self) -> bool {
        self.definition == FrontItemDef::AIR
    }
}

/// Bucket contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketKind {
    Empty,
    Water,
    Lava,
    Milk,
    PowderSnow,
    /// Bucket holding a fish or axolotl.
    Mob,
}

/// Item classes the interaction engine special-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemKind {
    #[default]
    Other,
    /// Places a block.
    Block,
    Boat,
    LilyPad,
    Frogspawn,
    GlassBottle,
    Bucket(BucketKind),
    SpawnEgg,
    Shield,
    PlayerHead,
    WritableBook,
}

impl ItemKind {
    /// Block-like items: lily pads and frogspawn place blocks too.
    pub fn is_block_item(self) -> bool {
        matches!(
            self,
            ItemKind::Block | ItemKind::LilyPad | ItemKind::Frogspawn | ItemKind::PlayerHead
        )
    }
}

/// Hand holding the item used in an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Main,
    Off,
}

impl Hand {
    /// Order in which hands are tried for entity interaction.
    pub const ALL: [Hand; 2] = [Hand::Main, Hand::Off];
}
