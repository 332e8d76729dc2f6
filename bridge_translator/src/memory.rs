//! In-memory world and registry tables.
//!
//! Used by the replay binary and the test harness. Registry tables
//! deserialize from the same JSON fixtures the replay tool reads.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use bridge_shared::{
    block::{BlockStateId, BlockTraits, FrontBlockId, FrontBlockTraits},
    item::{BackItemId, FrontItemData, FrontItemDef, ItemKind, ItemStack},
    math::{Vec3, Vec3i},
};
use serde::{Deserialize, Serialize};

use crate::collaborators::{Registries, WorldState};

/// Square world border on the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBorder {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl WorldBorder {
    /// Border of `size` blocks centred on `(center_x, center_z)`.
    pub fn centered(center_x: f64, center_z: f64, size: f64) -> Self {
        let half = size / 2.0;
        Self {
            min_x: center_x - half,
            min_z: center_z - half,
            max_x: center_x + half,
            max_z: center_z + half,
        }
    }

    pub fn contains(&self, position: Vec3) -> bool {
        let x = position.x as f64;
        let z = position.z as f64;
        x > self.min_x && x < self.max_x && z > self.min_z && z < self.max_z
    }
}

/// Sparse block map; unset cells are air.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    blocks: RwLock<HashMap<Vec3i, BlockStateId>>,
    border: RwLock<Option<WorldBorder>>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_block(&self, position: Vec3i, state: BlockStateId) {
        let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);
        if state == BlockStateId::AIR {
            blocks.remove(&position);
        } else {
            blocks.insert(position, state);
        }
    }

    pub fn set_border(&self, border: Option<WorldBorder>) {
        *self.border.write().unwrap_or_else(PoisonError::into_inner) = border;
    }
}

impl WorldState for MemoryWorld {
    fn block_at(&self, position: Vec3i) -> BlockStateId {
        self.blocks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&position)
            .copied()
            .unwrap_or(BlockStateId::AIR)
    }

    fn is_inside_border(&self, position: Vec3) -> bool {
        self.border
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(true, |b| b.contains(position))
    }
}

/// One back block state row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub state: BlockStateId,
    pub front: FrontBlockId,
    #[serde(default)]
    pub traits: BlockTraits,
}

/// One front block row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontBlockEntry {
    pub front: FrontBlockId,
    #[serde(default)]
    pub traits: FrontBlockTraits,
}

/// One item row, linking both protocols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub item: BackItemId,
    pub front: FrontItemDef,
    pub identifier: String,
    #[serde(default)]
    pub kind: ItemKind,
}

/// Serialized registry tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryTables {
    #[serde(default)]
    pub front_air: FrontBlockId,
    pub front_water: FrontBlockId,
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
    #[serde(default)]
    pub front_blocks: Vec<FrontBlockEntry>,
    #[serde(default)]
    pub items: Vec<ItemEntry>,
}

/// Lookup tables behind [`Registries`]. Unknown blocks map to air and
/// unknown items to [`ItemKind::Other`].
#[derive(Debug, Clone, Default)]
pub struct StaticRegistries {
    front_air: FrontBlockId,
    front_water: FrontBlockId,
    blocks: HashMap<BlockStateId, (FrontBlockId, BlockTraits)>,
    front_blocks: HashMap<FrontBlockId, FrontBlockTraits>,
    items: HashMap<BackItemId, ItemEntry>,
    front_items: HashMap<FrontItemDef, ItemKind>,
}

impl StaticRegistries {
    pub fn new(front_air: FrontBlockId, front_water: FrontBlockId) -> Self {
        Self {
            front_air,
            front_water,
            ..Self::default()
        }
    }

    pub fn with_block(mut self, state: BlockStateId, front: FrontBlockId, traits: BlockTraits) -> Self {
        self.blocks.insert(state, (front, traits));
        self
    }

    pub fn with_front_block(mut self, front: FrontBlockId, traits: FrontBlockTraits) -> Self {
        self.front_blocks.insert(front, traits);
        self
    }

    pub fn with_item(
        mut self,
        item: BackItemId,
        front: FrontItemDef,
        identifier: impl Into<String>,
        kind: ItemKind,
    ) -> Self {
        self.front_items.insert(front, kind);
        self.items.insert(
            item,
            ItemEntry {
                item,
                front,
                identifier: identifier.into(),
                kind,
            },
        );
        self
    }

    pub fn from_tables(tables: RegistryTables) -> Self {
        let mut registries = Self::new(tables.front_air, tables.front_water);
        for b in tables.blocks {
            registries = registries.with_block(b.state, b.front, b.traits);
        }
        for f in tables.front_blocks {
            registries = registries.with_front_block(f.front, f.traits);
        }
        for i in tables.items {
            registries = registries.with_item(i.item, i.front, i.identifier, i.kind);
        }
        registries
    }
}

impl Registries for StaticRegistries {
    fn front_block(&self, state: BlockStateId) -> FrontBlockId {
        self.blocks
            .get(&state)
            .map_or(self.front_air, |(front, _)| *front)
    }

    fn front_water(&self) -> FrontBlockId {
        self.front_water
    }

    fn front_air(&self) -> FrontBlockId {
        self.front_air
    }

    fn block_traits(&self, state: BlockStateId) -> BlockTraits {
        self.blocks
            .get(&state)
            .map_or(BlockTraits::empty(), |(_, traits)| *traits)
    }

    fn has_extended_collision(&self) -> bool {
        self.blocks
            .values()
            .any(|(_, traits)| traits.contains(BlockTraits::EXTENDED_COLLISION))
    }

    fn front_block_traits(&self, block: FrontBlockId) -> FrontBlockTraits {
        self.front_blocks.get(&block).copied().unwrap_or_default()
    }

    fn item_kind(&self, item: BackItemId) -> ItemKind {
        self.items.get(&item).map(|e| e.kind).unwrap_or_default()
    }

    fn front_item_kind(&self, definition: FrontItemDef) -> ItemKind {
        self.front_items.get(&definition).copied().unwrap_or_default()
    }

    fn front_item(&self, stack: &ItemStack) -> FrontItemData {
        if stack.is_empty() {
            return FrontItemData::AIR;
        }
        self.items
            .get(&stack.item)
            .map_or(FrontItemData::AIR, |e| FrontItemData::new(e.front, stack.count))
    }

    fn item_identifier(&self, item: BackItemId) -> String {
        self.items
            .get(&item)
            .map_or_else(|| "minecraft:air".to_string(), |e| e.identifier.clone())
    }
}
