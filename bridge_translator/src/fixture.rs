//! Replay fixtures: the world, registries and player a recorded session
//! starts from.

use anyhow::Context;
use bridge_shared::{
    block::BlockStateId,
    entity::Entity,
    item::ItemStack,
    math::Vec3i,
};
use serde::Deserialize;

use crate::{
    memory::{MemoryWorld, RegistryTables, StaticRegistries, WorldBorder},
    session::{PlayerState, Session},
};

#[derive(Debug, Clone, Deserialize)]
pub struct PlacedBlock {
    pub position: Vec3i,
    pub state: BlockStateId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotContents {
    pub slot: usize,
    pub item: ItemStack,
}

fn default_name() -> String {
    "replay".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayFixture {
    #[serde(default = "default_name")]
    pub name: String,
    pub registries: RegistryTables,
    #[serde(default)]
    pub blocks: Vec<PlacedBlock>,
    #[serde(default)]
    pub border: Option<WorldBorder>,
    pub player: PlayerState,
    #[serde(default)]
    pub held_slot: usize,
    #[serde(default)]
    pub slots: Vec<SlotContents>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl ReplayFixture {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("parse replay fixture")
    }

    pub fn world(&self) -> MemoryWorld {
        let world = MemoryWorld::new();
        for b in &self.blocks {
            world.set_block(b.position, b.state);
        }
        world.set_border(self.border);
        world
    }

    pub fn registries(&self) -> StaticRegistries {
        StaticRegistries::from_tables(self.registries.clone())
    }

    /// Loads inventory and entities into a freshly created session.
    pub fn populate(&self, session: &mut Session) {
        session.inventory.set_held_slot(self.held_slot);
        for s in &self.slots {
            session.inventory.set_item(s.slot, s.item);
        }
        for e in &self.entities {
            session.entities.insert(e.clone());
        }
    }
}
